//! Error types for wire format operations.

use std::fmt;

use msg::MsgError;

use crate::limits::MAX_AREA_BYTES;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while decoding wire structures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
    /// The underlying message ended mid-structure.
    Msg(MsgError),

    /// A frame header declared more area bytes than the protocol allows.
    AreaBitsTooLong { len: u8 },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Msg(err) => write!(f, "message error: {err}"),
            Self::AreaBitsTooLong { len } => {
                write!(f, "area bits length {len} exceeds maximum {MAX_AREA_BYTES}")
            }
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Msg(err) => Some(err),
            Self::AreaBitsTooLong { .. } => None,
        }
    }
}

impl From<MsgError> for WireError {
    fn from(err: MsgError) -> Self {
        Self::Msg(err)
    }
}
