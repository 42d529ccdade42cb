//! Integration test common infrastructure.
//!
//! Provides utilities for spawning test servers, creating TCP and WebSocket
//! test clients, and asserting on event flows.

pub mod client;
pub mod server;
pub mod ws;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::{ServerOptions, TestServer};
#[allow(unused_imports)]
pub use ws::WsClient;

use std::time::Duration;

/// Time allowed for the server to attach freshly accepted connections.
#[allow(dead_code)]
pub const SETTLE: Duration = Duration::from_millis(150);

/// Let the server catch up with connections and events already sent.
#[allow(dead_code)]
pub async fn settle() {
    tokio::time::sleep(SETTLE).await;
}
