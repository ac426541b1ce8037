//! Error types for codec operations.
//!
//! Every variant here is fatal for the session: a failed frame leaves the
//! byte stream in an unknown position, so the caller must drop the
//! connection. Recoverable conditions are logged, not returned.

use std::fmt;

use msg::MsgError;
use wire::{WireError, MAX_ENTITIES, MAX_SNAPSHOT_ENTITIES};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The message ended before the frame did.
    Msg(MsgError),

    /// Wire structure error.
    Wire(WireError),

    /// An entity record named a number outside the addressable range.
    EntityNumberOutOfRange { number: u16 },

    /// A snapshot produced more entities than the protocol allows.
    TooManyEntities { count: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Msg(e) => write!(f, "message error: {e}"),
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::EntityNumberOutOfRange { number } => {
                write!(
                    f,
                    "entity number {number} outside valid range 1..{MAX_ENTITIES}"
                )
            }
            Self::TooManyEntities { count } => {
                write!(
                    f,
                    "snapshot entity count {count} exceeds maximum {MAX_SNAPSHOT_ENTITIES}"
                )
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Msg(e) => Some(e),
            Self::Wire(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MsgError> for CodecError {
    fn from(err: MsgError) -> Self {
        Self::Msg(err)
    }
}

impl From<WireError> for CodecError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}
