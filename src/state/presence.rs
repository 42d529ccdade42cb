//! Presence broadcaster.
//!
//! Each registry change is followed by exactly one full snapshot pushed to
//! every open connection. Snapshots are authoritative: clients replace their
//! presence view with each one. There is no diffing and no coalescing.

use super::hub::{BroadcastReport, Hub};
use super::registry::ConnectionEntry;
use presence_proto::{PresenceEntry, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

impl Hub {
    /// Queue `snapshot` on every open connection.
    ///
    /// Callers hold `broadcast_gate`. Queuing never waits: a connection whose
    /// queue is full misses this snapshot and catches up with the next one.
    pub(super) fn fan_out_presence(&self, snapshot: &[ConnectionEntry]) -> BroadcastReport {
        let event = Arc::new(ServerEvent::presence(
            snapshot.iter().map(PresenceEntry::from).collect(),
        ));

        let mut report = BroadcastReport::default();
        for conn in self.connections.iter() {
            match conn.value().try_send(Arc::clone(&event)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    debug!(conn = %conn.key(), "Presence update dropped: outgoing queue full");
                }
                // Receiver already gone; its disconnect is in flight.
                Err(TrySendError::Closed(_)) => {}
            }
        }

        crate::metrics::record_presence_broadcast(report.delivered, report.dropped);
        report
    }
}
