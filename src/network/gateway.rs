//! Gateway - TCP and WebSocket listeners that accept incoming connections.
//!
//! The Gateway binds the configured sockets and spawns a Connection task
//! for each incoming client.

use crate::config::{LimitsConfig, ListenConfig, WebSocketConfig};
use crate::handlers::Router;
use crate::network::{Connection, Transport};
use crate::state::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_tungstenite::accept_hdr_async_with_config;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig as FramingConfig;
use tracing::{error, info, instrument, warn};

/// What every accepted connection needs.
#[derive(Clone)]
struct Shared {
    hub: Arc<Hub>,
    router: Arc<Router>,
    limits: LimitsConfig,
}

impl Shared {
    fn connection(&self, transport: Transport, addr: SocketAddr) -> Connection {
        Connection::new(
            self.hub.conn_ids.next(),
            transport,
            addr,
            Arc::clone(&self.hub),
            Arc::clone(&self.router),
            self.limits.clone(),
        )
    }
}

/// The Gateway accepts incoming connections and spawns handlers.
pub struct Gateway {
    tcp_listener: Option<TcpListener>,
    websocket_listener: Option<(TcpListener, WebSocketConfig)>,
    shared: Shared,
}

impl Gateway {
    /// Bind the gateway to the configured addresses.
    pub async fn bind(
        listen: Option<ListenConfig>,
        websocket: Option<WebSocketConfig>,
        limits: LimitsConfig,
        hub: Arc<Hub>,
        router: Arc<Router>,
    ) -> anyhow::Result<Self> {
        let tcp_listener = match listen {
            Some(cfg) => {
                let listener = TcpListener::bind(cfg.address).await?;
                info!(address = %cfg.address, "TCP listener bound");
                Some(listener)
            }
            None => None,
        };

        let websocket_listener = match websocket {
            Some(cfg) => {
                let listener = TcpListener::bind(cfg.address).await?;
                info!(address = %cfg.address, "WebSocket listener bound");
                Some((listener, cfg))
            }
            None => None,
        };

        if tcp_listener.is_none() && websocket_listener.is_none() {
            anyhow::bail!("no listener configured");
        }

        Ok(Self {
            tcp_listener,
            websocket_listener,
            shared: Shared {
                hub,
                router,
                limits,
            },
        })
    }

    /// Run the gateway, accepting connections until a listener fails.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let mut listeners = JoinSet::new();

        if let Some(listener) = self.tcp_listener {
            listeners.spawn(accept_tcp(listener, self.shared.clone()));
        }
        if let Some((listener, config)) = self.websocket_listener {
            listeners.spawn(accept_websocket(listener, Arc::new(config), self.shared.clone()));
        }

        // Accept loops only return on failure.
        while let Some(joined) = listeners.join_next().await {
            joined?;
        }
        Ok(())
    }
}

async fn accept_tcp(listener: TcpListener, shared: Shared) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!(%addr, "TCP connection accepted");
                let connection = shared.connection(
                    Transport::lines(stream, shared.limits.max_event_bytes),
                    addr,
                );
                tokio::spawn(async move {
                    if let Err(e) = connection.run().await {
                        warn!(%addr, error = %e, "TCP connection error");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "Failed to accept TCP connection");
            }
        }
    }
}

async fn accept_websocket(listener: TcpListener, config: Arc<WebSocketConfig>, shared: Shared) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!(%addr, "WebSocket connection attempt");
                let shared = shared.clone();
                let config = Arc::clone(&config);
                tokio::spawn(async move {
                    websocket_handshake(stream, addr, &config, shared).await;
                });
            }
            Err(e) => {
                error!(error = %e, "Failed to accept WebSocket connection");
            }
        }
    }
}

/// Frame and message size limits enforced by tungstenite while reading, so
/// an oversized event is rejected before it is buffered.
fn framing_config(max_event_bytes: usize) -> FramingConfig {
    FramingConfig {
        max_message_size: Some(max_event_bytes),
        max_frame_size: Some(max_event_bytes),
        ..FramingConfig::default()
    }
}

async fn websocket_handshake(
    stream: TcpStream,
    addr: SocketAddr,
    config: &WebSocketConfig,
    shared: Shared,
) {
    // Origin allow-list check during the HTTP upgrade.
    let origin_check = |req: &Request, response: Response| {
        let origin = req
            .headers()
            .get(http::header::ORIGIN)
            .and_then(|o| o.to_str().ok());
        if config.origin_allowed(origin) {
            return Ok(response);
        }
        warn!(%addr, origin = origin.unwrap_or("-"), "WebSocket origin rejected");
        let mut rejection = ErrorResponse::new(Some("origin not allowed".to_string()));
        *rejection.status_mut() = http::StatusCode::FORBIDDEN;
        Err(rejection)
    };

    let framing = framing_config(shared.limits.max_event_bytes);
    match accept_hdr_async_with_config(stream, origin_check, Some(framing)).await {
        Ok(ws_stream) => {
            let connection = shared.connection(Transport::websocket(ws_stream), addr);
            if let Err(e) = connection.run().await {
                warn!(%addr, error = %e, "WebSocket connection error");
            }
        }
        Err(e) => {
            warn!(%addr, error = %e, "WebSocket handshake failed");
        }
    }
}
