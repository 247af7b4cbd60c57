//! Push-button bank decoding
//!
//! KEY lines are active-low: a pressed button reads as 0. A [`ButtonState`]
//! holds one inverted snapshot of the whole bank.

use serde::Serialize;

/// Physical buttons wired to the KEY register
pub const BUTTON_COUNT: usize = 4;

/// Logical button snapshot, bit `i` set when button `i` is pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    bits: u32,
}

impl ButtonState {
    /// Decode a raw (active-low) KEY register value
    pub fn from_raw(raw: u32) -> Self {
        Self { bits: !raw }
    }

    /// Raw register value this snapshot was decoded from
    pub fn raw(&self) -> u32 {
        !self.bits
    }

    /// Inverted register value, one bit per pressed button
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        index < u32::BITS as usize && (self.bits >> index) & 1 == 1
    }

    /// Indices of pressed physical buttons
    pub fn pressed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..BUTTON_COUNT).filter(move |&i| self.is_pressed(i))
    }

    pub fn any(&self) -> bool {
        self.pressed().next().is_some()
    }

    /// Fill `out[i]` with 1 if button `i` is pressed, else 0
    pub fn fill(&self, out: &mut [u8]) {
        for (i, level) in out.iter_mut().enumerate() {
            *level = self.is_pressed(i) as u8;
        }
    }

    /// First `count` button levels as 0/1
    pub fn levels(&self, count: usize) -> Vec<u8> {
        let mut out = vec![0; count];
        self.fill(&mut out);
        out
    }
}
