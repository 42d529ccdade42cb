//! The Hub - shared relay state.
//!
//! Owns the connection registry, the queue sender of every open connection,
//! and the connection id generator. Connection tasks hold an `Arc<Hub>` and
//! drive it through announce / route / disconnect.

use super::conn_id::{ConnectionId, ConnectionIdGenerator};
use super::registry::{ConnectionEntry, ConnectionRegistry};
use crate::config::Config;
use dashmap::DashMap;
use parking_lot::Mutex;
use presence_proto::ServerEvent;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Outgoing queue of one connection.
pub type EventSender = mpsc::Sender<Arc<ServerEvent>>;

/// Receiving end of a connection's outgoing queue.
pub type ServerEventReceiver = mpsc::Receiver<Arc<ServerEvent>>;

/// Settings the Hub needs from the server configuration.
#[derive(Debug, Clone)]
pub struct HubOptions {
    pub server_name: String,
    pub node_id: String,
    pub bind_sender_identity: bool,
}

impl From<&Config> for HubOptions {
    fn from(config: &Config) -> Self {
        Self {
            server_name: config.server.name.clone(),
            node_id: config.server.node_id.clone(),
            bind_sender_identity: config.routing.bind_sender_identity,
        }
    }
}

/// Counts from one presence fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the snapshot was queued for.
    pub delivered: usize,
    /// Connections skipped because their queue was full.
    pub dropped: usize,
}

/// Result of an identity announcement.
#[derive(Debug, Clone)]
pub struct AnnounceOutcome {
    /// Whether the registry gained an entry (false for a user already online).
    pub inserted: bool,
    pub broadcast: BroadcastReport,
}

/// Result of routing one direct message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued on the recipient's connection.
    Delivered,
    /// No registry entry for the recipient.
    RecipientOffline,
    /// The recipient's outgoing queue is full.
    QueueFull,
    /// The recipient's connection is closing.
    ConnectionClosed,
}

impl Delivery {
    /// Static label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::RecipientOffline => "recipient_offline",
            Self::QueueFull => "queue_full",
            Self::ConnectionClosed => "connection_closed",
        }
    }
}

/// Shared relay state.
pub struct Hub {
    pub server_name: String,
    pub conn_ids: ConnectionIdGenerator,
    /// Whether `senderId` must equal the sending connection's identity.
    pub bind_sender_identity: bool,
    pub(super) registry: ConnectionRegistry,
    /// Every open connection, identified or not.
    pub(super) connections: DashMap<ConnectionId, EventSender>,
    /// Serializes registry mutation with its presence fan-out so every
    /// connection receives snapshots in mutation order.
    pub(super) broadcast_gate: Mutex<()>,
}

impl Hub {
    pub fn new(options: HubOptions) -> Self {
        Self {
            server_name: options.server_name,
            conn_ids: ConnectionIdGenerator::new(options.node_id),
            bind_sender_identity: options.bind_sender_identity,
            registry: ConnectionRegistry::new(),
            connections: DashMap::new(),
            broadcast_gate: Mutex::new(()),
        }
    }

    /// Track a newly opened connection. No registry change.
    pub fn attach(&self, handle: &str, sender: EventSender) {
        self.connections.insert(handle.to_string(), sender);
        crate::metrics::set_open_connections(self.connections.len());
    }

    /// Register `handle` for `user_id` and push the resulting presence
    /// snapshot to every open connection.
    pub fn announce(&self, handle: &str, user_id: &str) -> AnnounceOutcome {
        let _gate = self.broadcast_gate.lock();
        let outcome = self.registry.add(user_id, handle);
        crate::metrics::set_registered_users(outcome.snapshot.len());
        let broadcast = self.fan_out_presence(&outcome.snapshot);
        AnnounceOutcome {
            inserted: outcome.inserted,
            broadcast,
        }
    }

    /// Forward a direct message to the connection registered for
    /// `receiver_id`. Never blocks; anything but [`Delivery::Delivered`]
    /// means the message was dropped.
    pub fn route_message(&self, sender_id: &str, receiver_id: &str, text: &str) -> Delivery {
        let Some(handle) = self.lookup(receiver_id) else {
            return Delivery::RecipientOffline;
        };
        let Some(sender) = self.connections.get(&handle).map(|r| r.value().clone()) else {
            return Delivery::ConnectionClosed;
        };

        match sender.try_send(Arc::new(ServerEvent::message(sender_id, text))) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::QueueFull,
            Err(TrySendError::Closed(_)) => Delivery::ConnectionClosed,
        }
    }

    /// Tear down a connection: stop pushing to it, drop its registry entry
    /// (if it holds one) and push the new snapshot to everyone left.
    pub fn disconnect(&self, handle: &str) -> Option<ConnectionEntry> {
        self.connections.remove(handle);
        crate::metrics::set_open_connections(self.connections.len());

        let _gate = self.broadcast_gate.lock();
        let outcome = self.registry.remove(handle);
        crate::metrics::set_registered_users(outcome.snapshot.len());
        let report = self.fan_out_presence(&outcome.snapshot);
        debug!(
            conn = %handle,
            user = outcome.removed.as_ref().map(|e| e.user_id.as_str()),
            recipients = report.delivered,
            "Presence updated after disconnect"
        );
        outcome.removed
    }

    /// The connection registered for `user_id`.
    pub fn lookup(&self, user_id: &str) -> Option<ConnectionId> {
        self.registry.lookup(user_id)
    }

    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }

    pub fn registered_users(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
impl Hub {
    /// A hub with test defaults.
    pub fn for_tests(bind_sender_identity: bool) -> Self {
        Self::new(HubOptions {
            server_name: "test.relay".to_string(),
            node_id: "T".to_string(),
            bind_sender_identity,
        })
    }
}
