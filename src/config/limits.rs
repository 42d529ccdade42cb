//! Per-connection limits configuration.

use governor::Quota;
use nonzero_ext::nonzero;
use serde::Deserialize;
use std::num::NonZeroU32;

/// Per-connection resource limits.
///
/// These keep one slow or abusive client from exhausting server memory or
/// starving other connections.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Outgoing event queue capacity per connection (default: 64).
    /// Events pushed to a full queue are dropped.
    #[serde(default = "default_outgoing_queue")]
    pub outgoing_queue: usize,
    /// Maximum size of one inbound event frame in bytes (default: 16384).
    #[serde(default = "default_max_event_bytes")]
    pub max_event_bytes: usize,
    /// Sustained inbound events per second per connection (default: 20).
    #[serde(default = "default_events_per_second")]
    pub events_per_second: NonZeroU32,
    /// Inbound burst capacity per connection (default: 40).
    #[serde(default = "default_event_burst")]
    pub event_burst: NonZeroU32,
}

impl LimitsConfig {
    /// Token bucket quota for one connection's inbound events.
    pub fn inbound_quota(&self) -> Quota {
        Quota::per_second(self.events_per_second).allow_burst(self.event_burst)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            outgoing_queue: default_outgoing_queue(),
            max_event_bytes: default_max_event_bytes(),
            events_per_second: default_events_per_second(),
            event_burst: default_event_burst(),
        }
    }
}

fn default_outgoing_queue() -> usize {
    64
}

fn default_max_event_bytes() -> usize {
    presence_proto::line::DEFAULT_MAX_LEN
}

fn default_events_per_second() -> NonZeroU32 {
    nonzero!(20u32)
}

fn default_event_burst() -> NonZeroU32 {
    nonzero!(40u32)
}
