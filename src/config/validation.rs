//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.node_id must be 1-4 ASCII alphanumerics, got '{0}'")]
    InvalidNodeId(String),
    #[error("no listener configured: set [listen] and/or [websocket]")]
    NoListeners,
    #[error("listen.address and websocket.address must differ")]
    DuplicateAddress,
    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    let node_id = &config.server.node_id;
    if node_id.is_empty() || node_id.len() > 4 || !node_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(ValidationError::InvalidNodeId(node_id.clone()));
    }

    match (&config.listen, &config.websocket) {
        (None, None) => errors.push(ValidationError::NoListeners),
        (Some(tcp), Some(ws)) if tcp.address == ws.address => {
            errors.push(ValidationError::DuplicateAddress)
        }
        _ => {}
    }

    let limits = &config.limits;
    if limits.outgoing_queue == 0 {
        errors.push(ValidationError::ZeroLimit("outgoing_queue"));
    }
    if limits.max_event_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("max_event_bytes"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
