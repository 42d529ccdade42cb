//! State management module.
//!
//! Contains the Hub (shared relay state), the connection registry it owns,
//! and per-connection session state.

mod conn_id;
mod hub;
mod presence;
mod registry;
mod session;

pub use conn_id::ConnectionId;
pub use hub::{Delivery, Hub, HubOptions, ServerEventReceiver};
pub use session::SessionState;
