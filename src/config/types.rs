//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::limits::LimitsConfig;
use super::listen::{ListenConfig, WebSocketConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    pub server: ServerConfig,
    /// Optional plain TCP listener.
    pub listen: Option<ListenConfig>,
    /// Optional WebSocket listener.
    pub websocket: Option<WebSocketConfig>,
    /// Per-connection limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Message routing policy.
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Log output.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used in logs and the health endpoint.
    pub name: String,
    /// Prefix of every connection handle issued by this node (default: "R01").
    #[serde(default = "default_node_id")]
    pub node_id: String,
    /// Prometheus metrics HTTP port (default: 9090, 0 disables).
    pub metrics_port: Option<u16>,
}

fn default_node_id() -> String {
    "R01".to_string()
}

/// Message routing policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutingConfig {
    /// Require `senderId` of every `sendMessage` to equal the identity the
    /// sending connection announced. Off by default: clients are trusted to
    /// name themselves, as deployed clients expect.
    #[serde(default)]
    pub bind_sender_identity: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Log configuration. The filter itself comes from `RUST_LOG`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::parse(
            r#"
[server]
name = "relay.test"

[websocket]
address = "127.0.0.1:8800"
"#,
        )
        .unwrap();

        assert_eq!(config.server.node_id, "R01");
        assert_eq!(config.server.metrics_port, None);
        assert!(config.listen.is_none());
        assert!(config.websocket.unwrap().allow_origins.is_empty());
        assert!(!config.routing.bind_sender_identity);
        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(config.limits.outgoing_queue, 64);
    }

    #[test]
    fn full_config_parses() {
        let config = Config::parse(
            r#"
[server]
name = "relay.test"
node_id = "EU1"
metrics_port = 0

[listen]
address = "127.0.0.1:8801"

[websocket]
address = "127.0.0.1:8800"
allow_origins = ["https://social.example"]

[limits]
outgoing_queue = 128
events_per_second = 5

[routing]
bind_sender_identity = true

[log]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.server.node_id, "EU1");
        assert_eq!(config.server.metrics_port, Some(0));
        assert_eq!(config.listen.unwrap().address.port(), 8801);
        assert_eq!(config.limits.outgoing_queue, 128);
        assert_eq!(config.limits.events_per_second.get(), 5);
        assert!(config.routing.bind_sender_identity);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn missing_server_section_fails() {
        assert!(matches!(
            Config::parse("[listen]\naddress = \"127.0.0.1:1\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
