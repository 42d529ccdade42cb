//! Event handler registry and dispatch.
//!
//! The `Router` owns one handler per client event and keeps usage counters
//! per event. Every dispatch runs inside an `event` span with a latency
//! timer.

use super::{AnnounceHandler, Context, Handler, HandlerResult, SendMessageHandler};
use crate::telemetry::{EventTimer, spans};
use presence_proto::ClientEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug};

/// Registry of event handlers.
pub struct Router {
    announce: AnnounceHandler,
    send_message: SendMessageHandler,
    event_counts: HashMap<&'static str, AtomicU64>,
}

impl Router {
    /// Create a router with every client event registered.
    pub fn new() -> Self {
        let event_counts = [ClientEvent::ADD_USER, ClientEvent::SEND_MESSAGE]
            .into_iter()
            .map(|name| (name, AtomicU64::new(0)))
            .collect();

        Self {
            announce: AnnounceHandler,
            send_message: SendMessageHandler,
            event_counts,
        }
    }

    /// Usage counts of events seen at least once, most used first.
    pub fn event_stats(&self) -> Vec<(&'static str, u64)> {
        let mut stats: Vec<_> = self
            .event_counts
            .iter()
            .map(|(name, count)| (*name, count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        stats
    }

    /// Dispatch an event to its handler.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, event: &ClientEvent) -> HandlerResult {
        let name = event.name();
        if let Some(counter) = self.event_counts.get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        let span = spans::event(name, ctx.conn_id, ctx.state.user_id());
        let _timer = EventTimer::new(name);

        let result = match event {
            ClientEvent::AddUser(payload) => {
                self.announce.handle(ctx, payload).instrument(span).await
            }
            ClientEvent::SendMessage(payload) => {
                self.send_message.handle(ctx, payload).instrument(span).await
            }
        };

        if let Err(ref e) = result {
            crate::metrics::record_event_error(name, e.error_code());
            debug!(event = name, conn = %ctx.conn_id, error = %e, "Event dropped");
        }

        result
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
