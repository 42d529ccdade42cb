//! Telemetry utilities for event timing and tracing spans.

use std::time::Instant;

/// Guard for timing event handling and recording metrics.
///
/// Records event latency when dropped.
pub struct EventTimer {
    event: &'static str,
    start: Instant,
}

impl EventTimer {
    /// Start timing an event.
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            start: Instant::now(),
        }
    }
}

impl Drop for EventTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_event(self.event, duration);
    }
}

/// Standardized span constructors for relay observability.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Create a span for a client connection.
    pub fn connection(conn: &str, addr: &str, transport: &str) -> Span {
        info_span!("connection", conn = %conn, addr = %addr, transport = %transport)
    }

    /// Create a span for one dispatched event.
    pub fn event(name: &str, conn: &str, user: Option<&str>) -> Span {
        if let Some(user) = user {
            debug_span!("event", name = %name, conn = %conn, user = %user)
        } else {
            debug_span!("event", name = %name, conn = %conn)
        }
    }
}
