//! Byte-level writer producing wire-identical messages.

use crate::{ANGLE16_UNIT, ANGLE_UNIT};

/// A growable writer for building outgoing messages.
///
/// Writes mirror [`MsgReader`](crate::MsgReader) reads byte for byte. The
/// writer is backed by a `Vec` and cannot fail; values wider than their wire
/// encoding are truncated the way the classic protocol truncates them.
#[derive(Debug, Default)]
pub struct MsgWriter {
    buf: Vec<u8>,
}

impl MsgWriter {
    /// Creates a new empty `MsgWriter`.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new `MsgWriter` with pre-allocated capacity in bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Clears the writer for reuse, keeping its allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Writes an unsigned byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Writes a signed 16-bit integer (little-endian).
    pub fn write_i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a signed 32-bit integer (little-endian).
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a world coordinate in fixed-point eighth units.
    pub fn write_coord(&mut self, value: f32) {
        self.write_i16((value * 8.0) as i32 as i16);
    }

    /// Writes a position as three fixed-point coordinates.
    pub fn write_pos(&mut self, value: [f32; 3]) {
        self.write_coord(value[0]);
        self.write_coord(value[1]);
        self.write_coord(value[2]);
    }

    /// Writes a low-resolution angle in degrees, wrapping modulo one turn.
    pub fn write_angle(&mut self, value: f32) {
        self.write_u8((value / ANGLE_UNIT) as i32 as u8);
    }

    /// Writes a high-resolution angle in degrees, wrapping modulo one turn.
    pub fn write_angle16(&mut self, value: f32) {
        self.write_i16((value / ANGLE16_UNIT) as i32 as i16);
    }

    /// Writes a run of raw bytes.
    pub fn write_data(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Consumes the writer and returns the written bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
