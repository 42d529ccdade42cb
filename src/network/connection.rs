//! Connection - handles one client connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//!   attach to Hub
//!        ↓
//!   tokio::select! ──► inbound frame ─► rate limit ─► decode ─► Router
//!        │
//!        └─────────► outgoing queue ─► encode ─► transport
//!        ↓
//!   disconnect from Hub (every exit path)
//! ```

use super::transport::{Inbound, Transport};
use crate::config::LimitsConfig;
use crate::handlers::{Context, Router};
use crate::state::{ConnectionId, Hub, ServerEventReceiver, SessionState};
use crate::telemetry::spans;
use governor::RateLimiter;
use presence_proto::{decode_client_event, encode_server_event};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, warn};

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// The peer closed the transport.
    PeerClosed,
    /// The peer exceeded its inbound event rate.
    Flooding,
}

/// A client connection handler.
pub struct Connection {
    conn_id: ConnectionId,
    addr: SocketAddr,
    transport: Transport,
    hub: Arc<Hub>,
    router: Arc<Router>,
    limits: LimitsConfig,
}

impl Connection {
    pub fn new(
        conn_id: ConnectionId,
        transport: Transport,
        addr: SocketAddr,
        hub: Arc<Hub>,
        router: Arc<Router>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            conn_id,
            addr,
            transport,
            hub,
            router,
            limits,
        }
    }

    /// Run the connection until the peer leaves or misbehaves.
    ///
    /// The Hub entry is removed and presence re-broadcast whatever the
    /// outcome, including transport errors.
    pub async fn run(self) -> anyhow::Result<()> {
        let span = spans::connection(&self.conn_id, &self.addr.to_string(), self.transport.kind());
        self.serve().instrument(span).await
    }

    async fn serve(mut self) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel(self.limits.outgoing_queue);
        self.hub.attach(&self.conn_id, tx);
        info!(server = %self.hub.server_name, "Client connected");

        let mut state = SessionState::default();
        let result = self.event_loop(&mut state, &mut rx).await;

        let previous = state.close();
        self.hub.disconnect(&self.conn_id);

        match &result {
            Ok(exit) => info!(user = previous.user_id(), reason = ?exit, "Client disconnected"),
            Err(e) => info!(user = previous.user_id(), error = %e, "Client disconnected"),
        }
        result.map(|_| ())
    }

    async fn event_loop(
        &mut self,
        state: &mut SessionState,
        rx: &mut ServerEventReceiver,
    ) -> anyhow::Result<Exit> {
        let limiter = RateLimiter::direct(self.limits.inbound_quota());

        loop {
            tokio::select! {
                frame = self.transport.next_frame() => {
                    let text = match frame? {
                        Some(Inbound::Text(text)) => text,
                        Some(Inbound::Binary(len)) => {
                            crate::metrics::record_malformed("binary");
                            debug!(len, "Ignoring binary frame");
                            continue;
                        }
                        None => return Ok(Exit::PeerClosed),
                    };

                    if limiter.check().is_err() {
                        crate::metrics::record_rate_limited();
                        warn!("Inbound event rate exceeded, closing connection");
                        return Ok(Exit::Flooding);
                    }

                    let event = match decode_client_event(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            crate::metrics::record_malformed(e.error_code());
                            debug!(error = %e, "Ignoring malformed event");
                            continue;
                        }
                    };

                    let mut ctx = Context {
                        conn_id: &self.conn_id,
                        hub: &self.hub,
                        state: &mut *state,
                        remote_addr: self.addr,
                    };
                    // Errors are logged and counted by the router; the client is never told.
                    let _ = self.router.dispatch(&mut ctx, &event).await;
                }
                Some(event) = rx.recv() => {
                    let text = encode_server_event(&event)?;
                    self.transport.send_text(text).await?;
                }
            }
        }
    }
}
