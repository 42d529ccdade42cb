//! Network module.
//!
//! Contains the Gateway (TCP and WebSocket listeners), the Connection
//! handler, and the client transports.

mod connection;
mod gateway;
mod transport;

pub use connection::Connection;
pub use gateway::Gateway;
pub use transport::Transport;
