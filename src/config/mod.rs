//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, RoutingConfig, LogConfig)
//! - [`listen`]: Network listener configuration (ListenConfig, WebSocketConfig)
//! - [`limits`]: Per-connection limits (LimitsConfig)
//! - [`validation`]: Startup validation of the loaded config

mod limits;
mod listen;
mod types;
mod validation;

pub use limits::LimitsConfig;
pub use listen::{ListenConfig, WebSocketConfig};
pub use types::{Config, LogFormat};
pub use validation::validate;
