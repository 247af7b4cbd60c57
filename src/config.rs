//! Board and service configuration
//!
//! ## Build-time Configuration
//! - `FPGA_PANEL_PORT`: HTTP server port (default: 8083)
//! - `FPGA_LW_BRIDGE_BASE`: bridge base address in hex (default: 0xFF200000)
//!
//! ## Runtime Configuration
//! - `PORT`: Override server port
//! - `FPGA_LW_BRIDGE_BASE`: Override bridge base address
//! - `FPGA_LW_BRIDGE_SPAN`: Override mapped span
//! - `FPGA_DEVICE`: Override the physical memory device (default: /dev/mem)

use std::path::PathBuf;

use crate::addr;
use crate::devmem::DEV_MEM;
use crate::error::FpgaError;
use crate::regs::{RegisterLayout, LW_BRIDGE_BASE, LW_BRIDGE_SPAN};

/// Default port (set at compile time via build.rs)
pub const DEFAULT_PORT: u16 = {
    match option_env!("FPGA_PANEL_DEFAULT_PORT") {
        Some(s) => {
            // const-compatible parsing
            let bytes = s.as_bytes();
            let mut result: u16 = 0;
            let mut i = 0;
            while i < bytes.len() {
                result = result * 10 + (bytes[i] - b'0') as u16;
                i += 1;
            }
            result
        }
        None => 8083,
    }
};

/// Default bridge address (set at compile time via build.rs)
pub const DEFAULT_LW_BRIDGE_BASE: &str = match option_env!("FPGA_DEFAULT_LW_BRIDGE_BASE") {
    Some(s) => s,
    None => "0xFF200000",
};

/// Where and how to map the panel registers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub device: PathBuf,
    pub base_addr: usize,
    pub span: usize,
    pub layout: RegisterLayout,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEV_MEM),
            base_addr: parse_addr(DEFAULT_LW_BRIDGE_BASE).unwrap_or(LW_BRIDGE_BASE),
            span: LW_BRIDGE_SPAN,
            layout: RegisterLayout::default(),
        }
    }
}

impl BoardConfig {
    /// Build-time defaults with runtime environment overrides
    pub fn from_env() -> Result<Self, FpgaError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BoardConfig::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FpgaError> {
        let mut config = Self::default();

        if let Some(base) = lookup("FPGA_LW_BRIDGE_BASE") {
            config.base_addr = parse_addr(&base)?;
        }
        if let Some(span) = lookup("FPGA_LW_BRIDGE_SPAN") {
            config.span = parse_addr(&span)?;
        }
        if let Some(device) = lookup("FPGA_DEVICE") {
            config.device = PathBuf::from(device);
        }

        config.layout.validate(config.span)?;
        Ok(config)
    }
}

/// Server port from `PORT`, falling back to the compile-time default
pub fn port_from_env() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Parse an address or size given as `0x`-prefixed hex or decimal
pub fn parse_addr(s: &str) -> Result<usize, FpgaError> {
    addr::parse(s).map_err(|e| FpgaError::Config(format!("invalid address {:?}: {}", s.trim(), e)))
}
