//! # presence-proto
//!
//! Wire protocol for the presence relay.
//!
//! Every frame carries one JSON event envelope of the form
//! `{"event": <name>, "data": <payload>}`. Clients announce an identity with
//! `addUser` and send direct messages with `sendMessage`; the server pushes
//! full presence snapshots with `getUsers` and delivers messages with
//! `getMessage`.
//!
//! ## Quick Start
//!
//! ```rust
//! use presence_proto::{ClientEvent, ServerEvent, decode_client_event, encode_server_event};
//!
//! // Older clients send the bare user id as the payload.
//! let event = decode_client_event(r#"{"event":"addUser","data":"alice"}"#).unwrap();
//! assert_eq!(event, ClientEvent::add_user("alice"));
//!
//! let delivery = ServerEvent::message("alice", "hi");
//! let wire = encode_server_event(&delivery).unwrap();
//! assert_eq!(wire, r#"{"event":"getMessage","data":{"senderId":"alice","text":"hi"}}"#);
//! ```
//!
//! With the `tokio` feature (on by default) the crate also provides
//! [`EventLineCodec`], a newline-delimited framing for raw TCP streams.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod event;
#[cfg(feature = "tokio")]
pub mod line;

pub use self::error::{ProtocolError, Result};
pub use self::event::{
    decode_client_event, decode_server_event, encode_client_event, encode_server_event,
    AnnounceIdentity, ClientEvent, MessageDelivery, PresenceEntry, SendMessage, ServerEvent,
};
#[cfg(feature = "tokio")]
pub use self::line::EventLineCodec;
