//! Error types for the presence wire protocol.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors produced while framing, decoding or encoding events.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// An I/O error occurred on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The frame is not a well-formed event: bad JSON, an unknown event
    /// name, or a missing payload field.
    #[error("malformed event: {0}")]
    Json(#[from] serde_json::Error),

    /// A frame exceeded the configured size limit.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Observed length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// A frame was not valid UTF-8.
    #[error("invalid UTF-8 at byte {byte_pos}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
    },
}

impl ProtocolError {
    /// Whether the error concerns the content of a single frame.
    ///
    /// Malformed frames can be skipped; every other error means the stream
    /// framing can no longer be trusted.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Static error code for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Json(_) => "malformed",
            Self::MessageTooLong { .. } => "too_long",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
        }
    }
}
