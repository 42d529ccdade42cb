//! Unified error handling for presenced.
//!
//! Handler errors never reach the client: the relay is best-effort and has
//! no error event. They exist for logging and metric labeling.

use thiserror::Error;

// ============================================================================
// Handler Errors (event processing)
// ============================================================================

/// Errors that can occur while handling one client event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// The connection already announced an identity.
    #[error("connection already identified as {0}")]
    AlreadyIdentified(String),

    /// `senderId` does not match the identity registered for the connection
    /// (only raised when sender binding is enabled).
    #[error("sender {claimed} does not match connection identity {bound:?}")]
    SenderMismatch {
        claimed: String,
        bound: Option<String>,
    },
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyIdentified(_) => "already_identified",
            Self::SenderMismatch { .. } => "sender_mismatch",
        }
    }
}

/// Result type for event handlers.
pub type HandlerResult = Result<(), HandlerError>;
