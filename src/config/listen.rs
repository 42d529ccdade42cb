//! Network listener configuration.

use serde::Deserialize;
use std::net::SocketAddr;

/// Plain TCP listener configuration (newline-delimited JSON events).
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:8801").
    pub address: SocketAddr,
}

/// WebSocket listener configuration (one JSON event per text frame).
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    /// Address to bind to for WebSocket (e.g., "0.0.0.0:8800").
    pub address: SocketAddr,
    /// Allowed origins for CORS (e.g., `["https://example.com"]`).
    /// Empty list allows all origins.
    #[serde(default)]
    pub allow_origins: Vec<String>,
}

impl WebSocketConfig {
    /// Whether a handshake carrying `origin` may proceed.
    ///
    /// Requests without an Origin header (non-browser clients) are only
    /// accepted when no allow-list is configured.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allow_origins.is_empty() {
            return true;
        }
        match origin {
            Some(origin) => self.allow_origins.iter().any(|a| a == "*" || a == origin),
            None => false,
        }
    }
}
