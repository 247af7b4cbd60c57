//! Build script for fpga-panel
//!
//! Reads compile-time configuration from environment variables:
//! - FPGA_PANEL_PORT: HTTP server port (default: 8083)
//! - FPGA_LW_BRIDGE_BASE: lightweight HPS-to-FPGA bridge base address (default: 0xFF200000)

#[path = "src/addr.rs"]
mod addr;

use std::process::exit;

fn main() {
    // Read configuration from environment (set during build)
    let port = std::env::var("FPGA_PANEL_PORT").unwrap_or_else(|_| "8083".to_string());
    let bridge = std::env::var("FPGA_LW_BRIDGE_BASE").unwrap_or_else(|_| "0xFF200000".to_string());

    // Parse and validate with the same rules the runtime overrides use
    let port: u16 = match port.trim().parse() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("FPGA_PANEL_PORT={:?} is not a valid port number: {}", port, e);
            exit(1);
        }
    };
    let bridge = match addr::parse(&bridge) {
        Ok(a) if a % 4 == 0 => a,
        Ok(a) => {
            eprintln!("FPGA_LW_BRIDGE_BASE=0x{:08X} is not word-aligned", a);
            exit(1);
        }
        Err(e) => {
            eprintln!("FPGA_LW_BRIDGE_BASE={:?} is not a valid address: {}", bridge, e);
            exit(1);
        }
    };

    // Pass to compiler as env values
    println!("cargo:rustc-env=FPGA_PANEL_DEFAULT_PORT={}", port);
    println!("cargo:rustc-env=FPGA_DEFAULT_LW_BRIDGE_BASE=0x{:08X}", bridge);

    // Rebuild if these change
    println!("cargo:rerun-if-env-changed=FPGA_PANEL_PORT");
    println!("cargo:rerun-if-env-changed=FPGA_LW_BRIDGE_BASE");
    println!("cargo:rerun-if-changed=src/addr.rs");
}
