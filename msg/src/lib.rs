//! Bounded byte-oriented message reading and writing for the qsnap protocol.
//!
//! This crate provides [`MsgReader`] and [`MsgWriter`] for decoding and
//! encoding server messages. It is designed for bounded, panic-free operation
//! with explicit error handling.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - Every read is bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about entities, snapshots, or frames.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use msg::{MsgReader, MsgWriter};
//!
//! let mut writer = MsgWriter::new();
//! writer.write_i32(42);
//! writer.write_coord(12.5);
//!
//! let bytes = writer.finish();
//!
//! let mut reader = MsgReader::new(&bytes);
//! assert_eq!(reader.read_i32().unwrap(), 42);
//! assert_eq!(reader.read_coord().unwrap(), 12.5);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{MsgError, MsgResult};
pub use reader::MsgReader;
pub use writer::MsgWriter;

/// World units per coordinate step: coordinates travel as eighth units in a
/// signed 16-bit integer.
pub const COORD_UNIT: f32 = 0.125;

/// Degrees per low-resolution angle step (one byte per full turn).
pub const ANGLE_UNIT: f32 = 360.0 / 256.0;

/// Degrees per high-resolution angle step (one 16-bit integer per full turn).
pub const ANGLE16_UNIT: f32 = 360.0 / 65536.0;
