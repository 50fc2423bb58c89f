//! Wire-level error kinds and error value helpers.
//!
//! ```rust
//! use tprotocol::{ProtocolError, ProtocolErrorKind};
//!
//! let err = ProtocolError::malformed("stream chunk carried no choices");
//! assert_eq!(err.kind, ProtocolErrorKind::Malformed);
//! assert!(err.to_string().contains("no choices"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    /// A JSON payload could not be decoded into the expected shape.
    Decode,
    /// A structurally valid payload is missing a required part.
    Malformed,
    /// The string table resource could not be parsed or lacks a key.
    StringTable,
    /// The upstream chunk stream failed.
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub kind: ProtocolErrorKind,
    pub message: String,
}

impl ProtocolError {
    pub fn new(kind: ProtocolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Decode, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Malformed, message)
    }

    pub fn string_table(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::StringTable, message)
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Stream, message)
    }
}

impl Display for ProtocolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(value: serde_json::Error) -> Self {
        ProtocolError::decode(value.to_string())
    }
}
