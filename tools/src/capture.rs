//! Capture file framing.
//!
//! A capture is a flat sequence of length-prefixed blocks: an `i32`
//! little-endian byte length followed by that many bytes, with a length of
//! `-1` terminating the stream. Each block starts with a one-byte command tag;
//! the rest of the block is that command's payload, encoded exactly as it
//! would appear in a live message stream.

use std::error::Error;
use std::fmt;

const END_MARKER: i32 = -1;

/// Command tag leading each capture block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerCommand {
    /// Server rate announcement. Payload: `i16` hz.
    ServerInfo,
    /// One spawn baseline entity record.
    Baseline,
    /// One frame message.
    Frame,
}

impl ServerCommand {
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::ServerInfo => 1,
            Self::Baseline => 2,
            Self::Frame => 3,
        }
    }

    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::ServerInfo),
            2 => Some(Self::Baseline),
            3 => Some(Self::Frame),
            _ => None,
        }
    }
}

/// Errors raised while walking a capture stream.
#[derive(Debug, PartialEq, Eq)]
pub enum CaptureError {
    /// The stream ended inside a length prefix or block body.
    Truncated { offset: usize },
    /// A block length was negative or ran past the end of the stream.
    BadBlockLength { offset: usize, len: i32 },
    /// The stream ended cleanly but without the end marker.
    MissingEndMarker,
    /// A block carried an unknown command tag.
    UnknownCommand { tag: u8 },
    /// A block had no room for a command tag.
    EmptyBlock { offset: usize },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { offset } => {
                write!(f, "capture truncated at offset {offset}")
            }
            Self::BadBlockLength { offset, len } => {
                write!(f, "bad block length {len} at offset {offset}")
            }
            Self::MissingEndMarker => write!(f, "capture ended without an end marker"),
            Self::UnknownCommand { tag } => write!(f, "unknown command tag {tag:#04x}"),
            Self::EmptyBlock { offset } => {
                write!(f, "empty block at offset {offset}")
            }
        }
    }
}

impl Error for CaptureError {}

/// Accumulates capture blocks in memory.
#[derive(Debug, Default)]
pub struct CaptureWriter {
    buf: Vec<u8>,
}

impl CaptureWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one block: the command tag, then the payload bytes.
    pub fn block(&mut self, command: ServerCommand, payload: &[u8]) {
        let len = (payload.len() + 1) as i32;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.push(command.tag());
        self.buf.extend_from_slice(payload);
    }

    /// Terminates the stream and returns the capture bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(&END_MARKER.to_le_bytes());
        self.buf
    }
}

/// Walks the blocks of a capture stream.
#[derive(Debug)]
pub struct CaptureReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    finished: bool,
}

impl<'a> CaptureReader<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            finished: false,
        }
    }

    /// Byte offset of the next unread block.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the next block, or `None` once the end marker is reached.
    pub fn next_block(&mut self) -> Result<Option<(ServerCommand, &'a [u8])>, CaptureError> {
        if self.finished {
            return Ok(None);
        }
        let start = self.offset;
        if start == self.bytes.len() {
            return Err(CaptureError::MissingEndMarker);
        }

        let prefix = self
            .bytes
            .get(start..start + 4)
            .ok_or(CaptureError::Truncated { offset: start })?;
        let len = i32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        self.offset += 4;

        if len == END_MARKER {
            self.finished = true;
            return Ok(None);
        }
        if len < 0 {
            return Err(CaptureError::BadBlockLength { offset: start, len });
        }

        let body = self
            .bytes
            .get(self.offset..self.offset + len as usize)
            .ok_or(CaptureError::BadBlockLength { offset: start, len })?;
        self.offset += len as usize;

        let (&tag, payload) = body
            .split_first()
            .ok_or(CaptureError::EmptyBlock { offset: start })?;
        let command =
            ServerCommand::from_tag(tag).ok_or(CaptureError::UnknownCommand { tag })?;
        Ok(Some((command, payload)))
    }
}
