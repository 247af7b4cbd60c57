//! DE1-SoC panel access
//!
//! Maps the lightweight HPS-to-FPGA bridge through `/dev/mem`, reads the KEY
//! push-buttons and drives the six HEX 7-segment displays.
//!
//! ```no_run
//! use fpga_panel::{Board, BoardConfig};
//!
//! let board = Board::open(&BoardConfig::from_env()?)?;
//! if board.read_buttons()?.is_pressed(0) {
//!     board.show_number(42)?;
//! }
//! board.close()?;
//! # Ok::<(), fpga_panel::FpgaError>(())
//! ```

mod addr;
pub mod api;
pub mod bank;
pub mod board;
pub mod buttons;
pub mod config;
pub mod devmem;
pub mod error;
pub mod regs;
pub mod segment;

pub use bank::{MemBank, RegisterBank};
pub use board::Board;
pub use buttons::ButtonState;
pub use config::BoardConfig;
pub use devmem::DevMem;
pub use error::FpgaError;
pub use regs::{HexDisplay, RegisterLayout};
