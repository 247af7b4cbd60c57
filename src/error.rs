//! Error type shared by the panel accessor and the REST layer

use std::fmt;
use std::io;

/// Everything that can go wrong while mapping or driving the panel
#[derive(Debug)]
pub enum FpgaError {
    /// The physical-memory device could not be opened
    DeviceOpen(io::Error),
    /// The device was opened but the window could not be mapped
    Mmap(io::Error),
    /// `munmap` reported failure while releasing the window
    Unmap(io::Error),
    /// Another board already owns the bridge window in this process
    AlreadyOpen,
    /// A register offset is misaligned or does not fit inside the span
    InvalidLayout { register: &'static str, offset: usize },
    /// Display position outside HEX0..HEX5
    InvalidPosition(usize),
    /// Value outside the decimal digit range 0..=9
    InvalidDigit(i64),
    /// Value outside the hexadecimal digit range 0..=15
    InvalidHexDigit(u8),
    /// More buttons requested than the bank has
    TooManyButtons(usize),
    /// Number is negative or does not fit on six displays
    NumberOutOfRange(i64),
    /// Register access landed outside the mapped bank
    RegisterOutOfRange(usize),
    /// Bad configuration value
    Config(String),
}

impl FpgaError {
    /// True for errors caused by caller input rather than the OS or hardware
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidPosition(_)
                | Self::InvalidDigit(_)
                | Self::InvalidHexDigit(_)
                | Self::TooManyButtons(_)
                | Self::NumberOutOfRange(_)
                | Self::RegisterOutOfRange(_)
        )
    }
}

impl fmt::Display for FpgaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceOpen(e) => write!(f, "Couldn't open physical memory device: {}", e),
            Self::Mmap(e) => write!(f, "Couldn't map bridge window: {}", e),
            Self::Unmap(e) => write!(f, "Couldn't unmap bridge window: {}", e),
            Self::AlreadyOpen => write!(f, "Bridge window is already mapped by another board"),
            Self::InvalidLayout { register, offset } => write!(
                f,
                "Register {} at offset 0x{:04X} is misaligned or outside the span",
                register, offset
            ),
            Self::InvalidPosition(p) => write!(f, "Display position {} out of range (0-5)", p),
            Self::InvalidDigit(v) => write!(f, "Digit {} out of range (0-9)", v),
            Self::InvalidHexDigit(v) => write!(f, "Hex digit {} out of range (0-15)", v),
            Self::TooManyButtons(n) => write!(
                f,
                "Requested {} buttons, bank has {}",
                n,
                crate::buttons::BUTTON_COUNT
            ),
            Self::NumberOutOfRange(n) => write!(f, "Number {} out of range (0-999999)", n),
            Self::RegisterOutOfRange(offset) => {
                write!(f, "Register offset 0x{:04X} outside mapped bank", offset)
            }
            Self::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for FpgaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DeviceOpen(e) | Self::Mmap(e) | Self::Unmap(e) => Some(e),
            _ => None,
        }
    }
}
