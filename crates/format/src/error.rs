//! Decoder error types

use thiserror::Error;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors produced while turning a payload into records
#[derive(Debug, Error)]
pub enum FormatError {
    /// Payload is not well-formed for the format, or has the wrong shape
    #[error("failed to decode {format} payload: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },

    /// Payload decoded to a sequence with no records
    #[error("{format} payload contains no records")]
    EmptyInput { format: &'static str },

    /// No decoder is registered under this name
    #[error("unknown input format '{0}'")]
    UnknownFormat(String),
}

impl FormatError {
    /// Create a decode error
    pub fn decode(format: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            format,
            message: message.into(),
        }
    }

    /// Create an empty input error
    pub fn empty(format: &'static str) -> Self {
        Self::EmptyInput { format }
    }

    /// Whether the payload itself was at fault
    pub fn is_payload_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::EmptyInput { .. })
    }
}
