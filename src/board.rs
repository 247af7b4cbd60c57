//! The push-button / 7-segment panel
//!
//! A [`Board`] owns the register bank for its whole lifetime. Register
//! accessors are methods on the board, so nothing can touch the window after
//! [`Board::close`] consumed it.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::bank::RegisterBank;
use crate::buttons::{ButtonState, BUTTON_COUNT};
use crate::config::BoardConfig;
use crate::devmem::DevMem;
use crate::error::FpgaError;
use crate::regs::{HexDisplay, RegisterLayout};
use crate::segment;

static WINDOW_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Process-wide ownership of the physical bridge window
#[derive(Debug)]
pub(crate) struct WindowClaim(());

impl WindowClaim {
    pub(crate) fn acquire() -> Result<Self, FpgaError> {
        WINDOW_CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| WindowClaim(()))
            .map_err(|_| FpgaError::AlreadyOpen)
    }
}

impl Drop for WindowClaim {
    fn drop(&mut self) {
        WINDOW_CLAIMED.store(false, Ordering::Release);
    }
}

/// Button bank plus six 7-segment displays behind a register bank
pub struct Board<B: RegisterBank = DevMem> {
    bank: B,
    layout: RegisterLayout,
    _claim: Option<WindowClaim>,
}

impl Board<DevMem> {
    /// Map the bridge window described by `config`
    ///
    /// Fails with [`FpgaError::AlreadyOpen`] while another board from
    /// `open` is alive in this process.
    pub fn open(config: &BoardConfig) -> Result<Self, FpgaError> {
        let claim = WindowClaim::acquire().map_err(|e| {
            tracing::error!("Bridge window at 0x{:08X} is already mapped", config.base_addr);
            e
        })?;
        config.layout.validate(config.span)?;

        let mem = DevMem::open(&config.device, config.base_addr, config.span)?;
        tracing::info!(
            "Panel mapped at 0x{:08X}, size {} bytes",
            config.base_addr,
            config.span
        );

        Ok(Self {
            bank: mem,
            layout: config.layout.clone(),
            _claim: Some(claim),
        })
    }

    /// Unmap the window and close the device
    ///
    /// The device descriptor is closed even if unmapping fails.
    pub fn close(self) -> Result<(), FpgaError> {
        let Board { bank, _claim, .. } = self;
        let base_addr = bank.base_addr();
        let result = bank.unmap();
        if result.is_ok() {
            tracing::info!("Panel at 0x{:08X} unmapped", base_addr);
        }
        result
    }
}

impl<B: RegisterBank> Board<B> {
    /// Drive the panel through any register bank
    pub fn with_bank(bank: B, layout: RegisterLayout) -> Result<Self, FpgaError> {
        layout.validate(bank.size())?;
        Ok(Self {
            bank,
            layout,
            _claim: None,
        })
    }

    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Snapshot the button bank with a single register read
    pub fn read_buttons(&self) -> Result<ButtonState, FpgaError> {
        self.bank
            .read32(self.layout.key)
            .map(ButtonState::from_raw)
            .ok_or(FpgaError::RegisterOutOfRange(self.layout.key))
    }

    /// Fill `pressed[i]` with 1 if button `i` is down, else 0
    pub fn read_keys(&self, pressed: &mut [u8]) -> Result<(), FpgaError> {
        if pressed.len() > BUTTON_COUNT {
            return Err(FpgaError::TooManyButtons(pressed.len()));
        }
        self.read_buttons()?.fill(pressed);
        Ok(())
    }

    /// Show decimal digit `value` on display `position`
    ///
    /// Invalid digits and positions are rejected without touching hardware.
    pub fn set_digit(&self, value: i32, position: usize) -> Result<(), FpgaError> {
        let display = HexDisplay::try_from(position)?;
        let pattern = segment::checked_digit(value).ok_or(FpgaError::InvalidDigit(value.into()))?;
        self.write_segments(display, pattern)
    }

    /// Show hexadecimal digit `nibble` on display `position`
    pub fn set_hex(&self, nibble: u8, position: usize) -> Result<(), FpgaError> {
        let display = HexDisplay::try_from(position)?;
        let pattern = segment::encode_hex(nibble).ok_or(FpgaError::InvalidHexDigit(nibble))?;
        self.write_segments(display, pattern)
    }

    /// Light an arbitrary active-high segment pattern
    pub fn set_segments(&self, pattern: u8, position: usize) -> Result<(), FpgaError> {
        let display = HexDisplay::try_from(position)?;
        self.write_segments(display, pattern & segment::SEGMENT_MASK)
    }

    /// Turn every segment of display `position` off
    pub fn blank(&self, position: usize) -> Result<(), FpgaError> {
        let display = HexDisplay::try_from(position)?;
        self.write_segments(display, segment::BLANK)
    }

    /// Blank all six displays
    pub fn clear(&self) -> Result<(), FpgaError> {
        for display in HexDisplay::ALL {
            self.write_segments(display, segment::BLANK)?;
        }
        Ok(())
    }

    /// Render `number` right-aligned across HEX5..HEX0
    pub fn show_number(&self, number: u32) -> Result<(), FpgaError> {
        let patterns = segment::number_patterns(number)?;
        for (display, pattern) in HexDisplay::ALL.into_iter().zip(patterns) {
            self.write_segments(display, pattern)?;
        }
        Ok(())
    }

    /// Active-high pattern currently latched on display `position`
    pub fn read_segments(&self, position: usize) -> Result<u8, FpgaError> {
        let offset = self.layout.hex(HexDisplay::try_from(position)?);
        self.bank
            .read32(offset)
            .map(segment::from_register)
            .ok_or(FpgaError::RegisterOutOfRange(offset))
    }

    /// Hand the register bank back, releasing any window claim
    pub fn into_bank(self) -> B {
        self.bank
    }

    fn write_segments(&self, hex: HexDisplay, pattern: u8) -> Result<(), FpgaError> {
        let offset = self.layout.hex(hex);
        let value = segment::to_register(pattern);
        tracing::trace!("{:?} <- 0x{:08X}", hex, value);
        if self.bank.write32(offset, value) {
            Ok(())
        } else {
            Err(FpgaError::RegisterOutOfRange(offset))
        }
    }
}
