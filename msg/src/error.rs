//! Error types for message operations.

use std::fmt;

/// Result type for message operations.
pub type MsgResult<T> = Result<T, MsgError>;

/// Errors that can occur while reading a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MsgError {
    /// Attempted to read past the end of the message.
    UnexpectedEnd {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },
}

impl fmt::Display for MsgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
        }
    }
}

impl std::error::Error for MsgError {}
