//! presenced - presence tracking and direct-message relay.
//!
//! Clients announce which user they are, every connection receives the list
//! of online users whenever it changes, and direct messages are relayed to
//! whichever connection a user is on.

mod config;
mod error;
mod handlers;
mod http;
mod metrics;
mod network;
mod state;
mod telemetry;

use crate::config::{Config, LogFormat};
use crate::handlers::Router;
use crate::network::Gateway;
use crate::state::{Hub, HubOptions};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // The log format lives in the config, so load it before tracing is up.
    let loaded = Config::load(&config_path);
    init_tracing(
        loaded
            .as_ref()
            .map(|c| c.log.format)
            .unwrap_or_default(),
    );

    let config = loaded.map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.name,
        node = %config.server.node_id,
        "Starting presenced"
    );

    let hub = Arc::new(Hub::new(HubOptions::from(&config)));

    // Prometheus metrics are optional.
    // Convention: metrics_port = 0 disables the HTTP endpoint (used by tests).
    let metrics_port = config.server.metrics_port.unwrap_or(9090);
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        info!("Metrics initialized");

        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            http::run_http_server(metrics_port, hub).await;
        });
        info!(port = metrics_port, "HTTP side-channel started");
    }

    let router = Arc::new(Router::new());
    let gateway = Gateway::bind(
        config.listen,
        config.websocket,
        config.limits,
        Arc::clone(&hub),
        Arc::clone(&router),
    )
    .await?;

    tokio::select! {
        result = gateway.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!(
                connections = hub.open_connections(),
                users = hub.registered_users(),
                "Shutting down"
            );
            for (event, count) in router.event_stats() {
                info!(event, count, "Events handled");
            }
        }
    }

    Ok(())
}
