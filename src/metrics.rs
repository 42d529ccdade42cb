//! Prometheus metrics collection for presenced.
//!
//! Exposed on the HTTP side-channel at `/metrics`. Every recorder is a no-op
//! until [`init`] has run, so unit tests never need a registry.
//!
//! ## Relay Metrics
//!
//! - `presence_events_total{event}` - Client events processed by type
//! - `presence_event_duration_seconds{event}` - Event handling latency
//! - `presence_event_errors_total{event,error}` - Handler errors by code
//! - `presence_messages_total{result}` - Direct messages by delivery result
//! - `presence_broadcast_fanout` - Connections reached per presence update

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Client events processed by type.
pub static EVENT_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler errors by event and error code.
pub static EVENT_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Inbound frames that could not be decoded, by reason.
pub static MALFORMED_EVENTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Direct messages by delivery result (delivered, recipient_offline, ...).
pub static MESSAGES: OnceLock<IntCounterVec> = OnceLock::new();

/// Presence snapshots broadcast.
pub static PRESENCE_BROADCASTS: OnceLock<IntCounter> = OnceLock::new();

/// Presence snapshots skipped because a connection's queue was full.
pub static PRESENCE_DROPPED: OnceLock<IntCounter> = OnceLock::new();

/// Connections closed for exceeding the inbound event rate.
pub static RATE_LIMITED: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Currently open connections, identified or not.
pub static OPEN_CONNECTIONS: OnceLock<IntGauge> = OnceLock::new();

/// Currently registered users.
pub static REGISTERED_USERS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Event handling latency by event type.
pub static EVENT_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Connections reached per presence broadcast.
pub static BROADCAST_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(EVENT_COUNTER, IntCounterVec::new(Opts::new("presence_events_total", "Client events processed by type"), &["event"]));
    register!(EVENT_ERRORS, IntCounterVec::new(Opts::new("presence_event_errors_total", "Handler errors by event and code"), &["event", "error"]));
    register!(MALFORMED_EVENTS, IntCounterVec::new(Opts::new("presence_malformed_events_total", "Undecodable inbound frames by reason"), &["reason"]));
    register!(MESSAGES, IntCounterVec::new(Opts::new("presence_messages_total", "Direct messages by delivery result"), &["result"]));
    register!(PRESENCE_BROADCASTS, IntCounter::new("presence_broadcasts_total", "Presence snapshots broadcast"));
    register!(PRESENCE_DROPPED, IntCounter::new("presence_updates_dropped_total", "Presence snapshots skipped on full queues"));
    register!(RATE_LIMITED, IntCounter::new("presence_rate_limited_total", "Connections closed for flooding"));
    register!(OPEN_CONNECTIONS, IntGauge::new("presence_open_connections", "Currently open connections"));
    register!(REGISTERED_USERS, IntGauge::new("presence_registered_users", "Currently registered users"));
    register!(EVENT_LATENCY, HistogramVec::new(
        HistogramOpts::new("presence_event_duration_seconds", "Event handling latency by type")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        &["event"]));
    register!(BROADCAST_FANOUT, Histogram::with_opts(
        HistogramOpts::new("presence_broadcast_fanout", "Connections reached per presence broadcast")
            .buckets(vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recorders
// ============================================================================

/// Record a handled event with latency.
#[inline]
pub fn record_event(event: &str, duration_secs: f64) {
    if let Some(c) = EVENT_COUNTER.get() {
        c.with_label_values(&[event]).inc();
    }
    if let Some(h) = EVENT_LATENCY.get() {
        h.with_label_values(&[event]).observe(duration_secs);
    }
}

/// Record a handler error.
#[inline]
pub fn record_event_error(event: &str, error: &str) {
    if let Some(c) = EVENT_ERRORS.get() {
        c.with_label_values(&[event, error]).inc();
    }
}

/// Record an undecodable inbound frame.
#[inline]
pub fn record_malformed(reason: &str) {
    if let Some(c) = MALFORMED_EVENTS.get() {
        c.with_label_values(&[reason]).inc();
    }
}

/// Record the result of routing one direct message.
#[inline]
pub fn record_message(result: &str) {
    if let Some(c) = MESSAGES.get() {
        c.with_label_values(&[result]).inc();
    }
}

/// Record one presence broadcast.
#[inline]
pub fn record_presence_broadcast(delivered: usize, dropped: usize) {
    if let Some(c) = PRESENCE_BROADCASTS.get() {
        c.inc();
    }
    if let Some(c) = PRESENCE_DROPPED.get() {
        c.inc_by(dropped as u64);
    }
    if let Some(h) = BROADCAST_FANOUT.get() {
        h.observe(delivered as f64);
    }
}

/// Record a connection closed by flood protection.
#[inline]
pub fn record_rate_limited() {
    if let Some(c) = RATE_LIMITED.get() {
        c.inc();
    }
}

#[inline]
pub fn set_open_connections(count: usize) {
    if let Some(g) = OPEN_CONNECTIONS.get() {
        g.set(count as i64);
    }
}

#[inline]
pub fn set_registered_users(count: usize) {
    if let Some(g) = REGISTERED_USERS.get() {
        g.set(count as i64);
    }
}
