//! Capture inspection and debugging tools for the qsnap protocol.
//!
//! This crate provides utilities for understanding recorded frame streams:
//!
//! - Walk capture files block by block
//! - Explain frame size by header, player, and entity record
//! - Replay a capture through a client session and dump the result
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

mod capture;
mod inspect;
mod replay;

pub use capture::{CaptureError, CaptureReader, CaptureWriter, ServerCommand};
pub use inspect::{describe_bits, inspect_capture, FrameInspect, InspectReport, RecordInspect};
pub use replay::{replay_capture, EntityReplay, FrameReplay, PlayerReplay, ReplayReport};
