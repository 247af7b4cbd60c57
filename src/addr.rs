//! Address parsing shared by the build script and runtime configuration

use std::num::ParseIntError;

/// Parse an address or size given as `0x`-prefixed hex or decimal
pub fn parse(s: &str) -> Result<usize, ParseIntError> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
}
