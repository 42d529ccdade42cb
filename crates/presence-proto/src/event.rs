//! Event envelopes exchanged between clients and the relay.
//!
//! Event names match the ones existing clients already emit and
//! listen for, so a client only needs to swap its transport.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Events a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Associate the sending connection with an application user id.
    #[serde(rename = "addUser")]
    AddUser(AnnounceIdentity),
    /// Send a direct message to another user.
    #[serde(rename = "sendMessage")]
    SendMessage(SendMessage),
}

impl ClientEvent {
    /// Wire name of the `addUser` event.
    pub const ADD_USER: &'static str = "addUser";
    /// Wire name of the `sendMessage` event.
    pub const SEND_MESSAGE: &'static str = "sendMessage";

    /// Build an identity announcement.
    pub fn add_user(user_id: impl Into<String>) -> Self {
        Self::AddUser(AnnounceIdentity {
            user_id: user_id.into(),
        })
    }

    /// Build a direct message.
    pub fn send_message(
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::SendMessage(SendMessage {
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            text: text.into(),
        })
    }

    /// The wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddUser(_) => Self::ADD_USER,
            Self::SendMessage(_) => Self::SEND_MESSAGE,
        }
    }
}

/// Payload of `addUser`.
///
/// Accepts either the bare user id string or `{"userId": ...}` and always
/// serializes as the object form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "AnnounceRepr")]
pub struct AnnounceIdentity {
    /// Opaque application user id. Not validated.
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnnounceRepr {
    Bare(String),
    #[serde(rename_all = "camelCase")]
    Object { user_id: String },
}

impl From<AnnounceRepr> for AnnounceIdentity {
    fn from(repr: AnnounceRepr) -> Self {
        match repr {
            AnnounceRepr::Bare(user_id) | AnnounceRepr::Object { user_id } => Self { user_id },
        }
    }
}

/// Payload of `sendMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    /// Claimed sender id, as supplied by the client.
    pub sender_id: String,
    /// Recipient user id.
    pub receiver_id: String,
    /// Message body.
    pub text: String,
}

/// Events the relay pushes to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Full presence snapshot, in registration order.
    #[serde(rename = "getUsers")]
    GetUsers(Vec<PresenceEntry>),
    /// A direct message addressed to this connection's user.
    #[serde(rename = "getMessage")]
    GetMessage(MessageDelivery),
}

impl ServerEvent {
    /// Wire name of the `getUsers` event.
    pub const GET_USERS: &'static str = "getUsers";
    /// Wire name of the `getMessage` event.
    pub const GET_MESSAGE: &'static str = "getMessage";

    /// Build a presence snapshot event.
    pub fn presence(entries: Vec<PresenceEntry>) -> Self {
        Self::GetUsers(entries)
    }

    /// Build a message delivery event.
    pub fn message(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::GetMessage(MessageDelivery {
            sender_id: sender_id.into(),
            text: text.into(),
        })
    }

    /// The wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetUsers(_) => Self::GET_USERS,
            Self::GetMessage(_) => Self::GET_MESSAGE,
        }
    }
}

/// One registered user in a presence snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    /// Application user id.
    pub user_id: String,
    /// Handle of the connection registered for this user.
    pub socket_id: String,
}

impl PresenceEntry {
    /// Create a presence entry.
    pub fn new(user_id: impl Into<String>, socket_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            socket_id: socket_id.into(),
        }
    }
}

/// Payload of `getMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDelivery {
    /// Sender id exactly as the sending client supplied it.
    pub sender_id: String,
    /// Message body.
    pub text: String,
}

/// Parse a client event from one frame.
pub fn decode_client_event(frame: &str) -> Result<ClientEvent> {
    Ok(serde_json::from_str(frame)?)
}

/// Serialize a client event into one frame (without trailing newline).
pub fn encode_client_event(event: &ClientEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

/// Parse a server event from one frame.
pub fn decode_server_event(frame: &str) -> Result<ServerEvent> {
    Ok(serde_json::from_str(frame)?)
}

/// Serialize a server event into one frame (without trailing newline).
pub fn encode_server_event(event: &ServerEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_user_bare_string() {
        let event = decode_client_event(r#"{"event":"addUser","data":"64f1c2"}"#).unwrap();
        assert_eq!(event, ClientEvent::add_user("64f1c2"));
        assert_eq!(event.name(), "addUser");
    }

    #[test]
    fn test_add_user_object_form() {
        let event = decode_client_event(r#"{"event":"addUser","data":{"userId":"u1"}}"#).unwrap();
        assert_eq!(event, ClientEvent::add_user("u1"));
    }

    #[test]
    fn test_add_user_serializes_as_object() {
        let wire = encode_client_event(&ClientEvent::add_user("u1")).unwrap();
        assert_eq!(wire, r#"{"event":"addUser","data":{"userId":"u1"}}"#);
    }

    #[test]
    fn test_send_message_fields() {
        let event = decode_client_event(
            r#"{"event":"sendMessage","data":{"senderId":"a","receiverId":"b","text":"hi"}}"#,
        )
        .unwrap();
        match event {
            ClientEvent::SendMessage(msg) => {
                assert_eq!(msg.sender_id, "a");
                assert_eq!(msg.receiver_id, "b");
                assert_eq!(msg.text, "hi");
            }
            other => panic!("expected sendMessage, got {:?}", other),
        }
    }

    #[test]
    fn test_send_message_missing_field_is_malformed() {
        let err = decode_client_event(r#"{"event":"sendMessage","data":{"senderId":"a","text":"hi"}}"#)
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_unknown_event_is_malformed() {
        let err = decode_client_event(r#"{"event":"joinRoom","data":"x"}"#).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_non_string_user_id_is_malformed() {
        assert!(decode_client_event(r#"{"event":"addUser","data":42}"#).is_err());
        assert!(decode_client_event(r#"{"event":"addUser"}"#).is_err());
    }

    #[test]
    fn test_presence_wire_shape() {
        let event = ServerEvent::presence(vec![
            PresenceEntry::new("a", "R01AAAAAA"),
            PresenceEntry::new("b", "R01AAAAAB"),
        ]);
        assert_eq!(
            encode_server_event(&event).unwrap(),
            r#"{"event":"getUsers","data":[{"userId":"a","socketId":"R01AAAAAA"},{"userId":"b","socketId":"R01AAAAAB"}]}"#
        );
    }

    #[test]
    fn test_empty_presence() {
        let wire = encode_server_event(&ServerEvent::presence(Vec::new())).unwrap();
        assert_eq!(wire, r#"{"event":"getUsers","data":[]}"#);
        assert_eq!(decode_server_event(&wire).unwrap(), ServerEvent::GetUsers(Vec::new()));
    }
}
