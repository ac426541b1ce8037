//! Byte-level reader with bounded operations.

use crate::error::{MsgError, MsgResult};
use crate::{ANGLE16_UNIT, ANGLE_UNIT, COORD_UNIT};

/// A sequential reader over a received message.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug)]
pub struct MsgReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MsgReader<'a> {
    /// Creates a new `MsgReader` over a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Reads an unsigned byte.
    pub fn read_u8(&mut self) -> MsgResult<u8> {
        let bytes = self.take::<1>()?;
        Ok(bytes[0])
    }

    /// Reads a signed 16-bit integer (little-endian).
    pub fn read_i16(&mut self) -> MsgResult<i16> {
        let bytes = self.take::<2>()?;
        Ok(i16::from_le_bytes(bytes))
    }

    /// Reads a signed 32-bit integer (little-endian).
    pub fn read_i32(&mut self) -> MsgResult<i32> {
        let bytes = self.take::<4>()?;
        Ok(i32::from_le_bytes(bytes))
    }

    /// Reads a fixed-point world coordinate.
    pub fn read_coord(&mut self) -> MsgResult<f32> {
        Ok(f32::from(self.read_i16()?) * COORD_UNIT)
    }

    /// Reads a position as three fixed-point coordinates.
    pub fn read_pos(&mut self) -> MsgResult<[f32; 3]> {
        Ok([self.read_coord()?, self.read_coord()?, self.read_coord()?])
    }

    /// Reads a low-resolution angle in degrees.
    pub fn read_angle(&mut self) -> MsgResult<f32> {
        Ok(f32::from(self.read_u8()?) * ANGLE_UNIT)
    }

    /// Reads a high-resolution angle in degrees.
    pub fn read_angle16(&mut self) -> MsgResult<f32> {
        Ok(f32::from(self.read_i16()?) * ANGLE16_UNIT)
    }

    /// Reads `len` raw bytes, borrowing them from the underlying message.
    pub fn read_data(&mut self, len: usize) -> MsgResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(MsgError::UnexpectedEnd {
                requested: len,
                available: self.remaining(),
            });
        }
        let run = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(run)
    }

    fn take<const N: usize>(&mut self) -> MsgResult<[u8; N]> {
        if N > self.remaining() {
            return Err(MsgError::UnexpectedEnd {
                requested: N,
                available: self.remaining(),
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}
