//! Client event handlers.
//!
//! This module contains the Handler trait and the event router that
//! dispatches decoded client events to the appropriate handler. Each
//! handler is typed by the payload of the one event it serves.

mod identity;
mod message;
mod router;

pub use identity::AnnounceHandler;
pub use message::SendMessageHandler;
pub use router::Router;

pub use crate::error::{HandlerError, HandlerResult};

use crate::state::{Hub, SessionState};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;

/// Handler context passed to each event handler.
pub struct Context<'a> {
    /// Handle of the connection the event arrived on.
    pub conn_id: &'a str,
    /// Shared relay state.
    pub hub: &'a Arc<Hub>,
    /// Per-connection session state.
    pub state: &'a mut SessionState,
    /// Remote address of the client.
    pub remote_addr: SocketAddr,
}

/// Trait implemented by all event handlers.
#[async_trait]
pub trait Handler<P: Sync>: Send + Sync {
    /// Handle the payload of one decoded client event.
    async fn handle(&self, ctx: &mut Context<'_>, payload: &P) -> HandlerResult;
}
