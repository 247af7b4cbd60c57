//! Register map of the DE1-SoC lightweight bridge panel peripherals

use serde::Serialize;

use crate::error::FpgaError;

/// Physical base of the lightweight HPS-to-FPGA bridge
pub const LW_BRIDGE_BASE: usize = 0xFF20_0000;
/// Bytes mapped from the bridge base
pub const LW_BRIDGE_SPAN: usize = 0x0000_5000;

// Byte offsets from the bridge base (Qsys address map)
pub const KEY_BASE: usize = 0x0050;
pub const HEX0_BASE: usize = 0x0020;
pub const HEX1_BASE: usize = 0x0030;
pub const HEX2_BASE: usize = 0x0040;
pub const HEX3_BASE: usize = 0x0060;
pub const HEX4_BASE: usize = 0x0070;
pub const HEX5_BASE: usize = 0x0080;

/// Number of 7-segment displays
pub const HEX_COUNT: usize = 6;

/// One of the six 7-segment displays, HEX0 being the rightmost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HexDisplay {
    Hex0,
    Hex1,
    Hex2,
    Hex3,
    Hex4,
    Hex5,
}

impl HexDisplay {
    pub const ALL: [HexDisplay; HEX_COUNT] = [
        HexDisplay::Hex0,
        HexDisplay::Hex1,
        HexDisplay::Hex2,
        HexDisplay::Hex3,
        HexDisplay::Hex4,
        HexDisplay::Hex5,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for HexDisplay {
    type Error = FpgaError;

    fn try_from(position: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(position)
            .copied()
            .ok_or(FpgaError::InvalidPosition(position))
    }
}

/// Byte offsets of the panel registers inside the mapped window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterLayout {
    pub key: usize,
    pub hex: [usize; HEX_COUNT],
}

impl Default for RegisterLayout {
    fn default() -> Self {
        Self {
            key: KEY_BASE,
            hex: [HEX0_BASE, HEX1_BASE, HEX2_BASE, HEX3_BASE, HEX4_BASE, HEX5_BASE],
        }
    }
}

impl RegisterLayout {
    /// Offset of a display register
    pub fn hex(&self, display: HexDisplay) -> usize {
        self.hex[display.index()]
    }

    /// Check every register is word-aligned and lies inside `span` bytes
    pub fn validate(&self, span: usize) -> Result<(), FpgaError> {
        const HEX_NAMES: [&str; HEX_COUNT] = ["HEX0", "HEX1", "HEX2", "HEX3", "HEX4", "HEX5"];

        let registers = std::iter::once(("KEY", self.key)).chain(HEX_NAMES.into_iter().zip(self.hex));
        for (register, offset) in registers {
            if offset % 4 != 0 || offset.checked_add(4).map_or(true, |end| end > span) {
                return Err(FpgaError::InvalidLayout { register, offset });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_fits_bridge_span() {
        RegisterLayout::default().validate(LW_BRIDGE_SPAN).unwrap();
    }

    #[test]
    fn default_registers_do_not_overlap() {
        let layout = RegisterLayout::default();
        let mut offsets: Vec<usize> = layout.hex.to_vec();
        offsets.push(layout.key);
        offsets.sort_unstable();
        offsets.dedup();
        assert_eq!(offsets.len(), HEX_COUNT + 1);
    }

    #[test]
    fn misplaced_register_is_rejected() {
        let mut layout = RegisterLayout::default();
        layout.hex[3] = 0x62;
        assert!(matches!(
            layout.validate(LW_BRIDGE_SPAN),
            Err(FpgaError::InvalidLayout { register: "HEX3", offset: 0x62 })
        ));

        let layout = RegisterLayout::default();
        assert!(matches!(
            layout.validate(0x40),
            Err(FpgaError::InvalidLayout { register: "KEY", offset: 0x50 })
        ));
    }

    #[test]
    fn positions_map_to_displays() {
        assert_eq!(HexDisplay::try_from(0).unwrap(), HexDisplay::Hex0);
        assert_eq!(HexDisplay::try_from(5).unwrap().index(), 5);
        assert!(matches!(HexDisplay::try_from(6), Err(FpgaError::InvalidPosition(6))));
    }
}
