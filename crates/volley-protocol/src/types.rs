//! Core wire types: identifiers, actions, and the message envelope.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identity of one connected client.
///
/// Assigned by the server when a connection opens and announced to the
/// client in the `connect` message. Serialized as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generates a fresh random identifier (UUID v4).
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ClientId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one game session. Clients share it out of band to invite
/// an opponent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random identifier (UUID v4).
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The verb carried by every envelope.
///
/// ```text
/// connect  S→C   identity assignment
/// create   C→S   new session; S→C reply with the snapshot
/// join     C→S   enter a session; S→C roster broadcast
/// start    C→S   begin play; S→C start broadcast
/// update   C→S   paddle position; S→C per-tick state
/// end      S→C   winner announcement
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Connect,
    Create,
    Join,
    Start,
    Update,
    End,
}

impl Action {
    /// The lowercase name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Create => "create",
            Self::Join => "join",
            Self::Start => "start",
            Self::Update => "update",
            Self::End => "end",
        }
    }

    /// Parses a wire name. Returns `None` for anything unrecognized.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "connect" => Self::Connect,
            "create" => Self::Create,
            "join" => Self::Join,
            "start" => Self::Start,
            "update" => Self::Update,
            "end" => Self::End,
            _ => return None,
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level message wrapper, identical in both directions.
///
/// `action` stays a raw string on the inbound side so that an unknown
/// verb surfaces as [`ProtocolError::UnknownAction`](crate::ProtocolError)
/// rather than a generic decode failure. Outbound envelopes are built with
/// [`Envelope::new`] from a typed [`Action`].
///
/// The client fills `clientId` with whatever the `connect` message told
/// it; the server never trusts that field and uses the connection's own
/// identity instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub action: String,

    #[serde(rename = "clientId", default)]
    pub client_id: Option<ClientId>,

    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Envelope {
    /// Builds an outbound envelope addressed to `client_id`.
    pub fn new(action: Action, client_id: ClientId, data: serde_json::Value) -> Self {
        Self {
            action: action.as_str().to_owned(),
            client_id: Some(client_id),
            data,
        }
    }

    /// The `connect` greeting sent once when a connection opens.
    pub fn connect(client_id: ClientId) -> Self {
        let mut data = serde_json::Map::new();
        data.insert(
            "clientId".to_owned(),
            serde_json::Value::String(client_id.as_str().to_owned()),
        );
        Self::new(Action::Connect, client_id, serde_json::Value::Object(data))
    }

    /// The typed action, if the name is recognized.
    pub fn action(&self) -> Option<Action> {
        Action::parse(&self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ClientId::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn test_random_ids_are_distinct_uuids() {
        let a = SessionId::random();
        let b = SessionId::random();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
        assert!(Uuid::parse_str(ClientId::random().as_str()).is_ok());
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in [
            Action::Connect,
            Action::Create,
            Action::Join,
            Action::Start,
            Action::Update,
            Action::End,
        ] {
            assert_eq!(Action::parse(action.as_str()), Some(action));
            assert_eq!(serde_json::to_value(action).unwrap(), action.as_str());
        }
        assert_eq!(Action::parse("teleport"), None);
        assert_eq!(Action::parse("Create"), None);
    }

    #[test]
    fn test_connect_envelope_shape() {
        let env = Envelope::connect(ClientId::from("c-1"));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["action"], "connect");
        assert_eq!(json["clientId"], "c-1");
        assert_eq!(json["data"]["clientId"], "c-1");
    }

    #[test]
    fn test_envelope_data_defaults_to_empty_object() {
        let env: Envelope = serde_json::from_str(r#"{"action":"create"}"#).unwrap();
        assert_eq!(env.action(), Some(Action::Create));
        assert!(env.client_id.is_none());
        assert!(env.data.as_object().is_some_and(|m| m.is_empty()));
    }

    #[test]
    fn test_envelope_accepts_null_client_id() {
        // A browser that has not seen `connect` yet sends `clientId: null`.
        let env: Envelope =
            serde_json::from_str(r#"{"action":"create","clientId":null,"data":{}}"#).unwrap();
        assert!(env.client_id.is_none());
    }
}
