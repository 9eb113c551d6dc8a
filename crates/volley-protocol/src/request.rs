//! Typed inbound requests.
//!
//! An [`Envelope`] carries its payload as loose JSON. The game layer
//! wants something it can `match` on, so every inbound envelope is
//! converted into a [`ClientRequest`] here, at the boundary. Anything
//! that cannot be converted is rejected before it reaches a session.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{Action, Envelope, ProtocolError, SessionId};

/// `data` of a `join` or `start` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameRef {
    #[serde(rename = "gameId")]
    pub game_id: SessionId,
}

/// `data` of an `update` request: the sender's paddle centre.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionUpdate {
    #[serde(rename = "gameId")]
    pub game_id: SessionId,
    pub pos: f64,
}

/// A client-issued action, validated for shape but not for permission.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    Create,
    Join { game_id: SessionId },
    Start { game_id: SessionId },
    Update { game_id: SessionId, pos: f64 },
}

impl ClientRequest {
    /// Converts a decoded envelope into a request.
    ///
    /// # Errors
    /// - [`ProtocolError::UnknownAction`] for unrecognized verbs and for
    ///   the server-only verbs `connect` and `end`.
    /// - [`ProtocolError::InvalidMessage`] when `data` lacks a field the
    ///   action needs.
    pub fn from_envelope(envelope: Envelope) -> Result<Self, ProtocolError> {
        let Some(action) = envelope.action() else {
            return Err(ProtocolError::UnknownAction(envelope.action));
        };

        match action {
            Action::Create => Ok(Self::Create),
            Action::Join => {
                let GameRef { game_id } = payload(action, envelope.data)?;
                Ok(Self::Join { game_id })
            }
            Action::Start => {
                let GameRef { game_id } = payload(action, envelope.data)?;
                Ok(Self::Start { game_id })
            }
            Action::Update => {
                let PositionUpdate { game_id, pos } = payload(action, envelope.data)?;
                Ok(Self::Update { game_id, pos })
            }
            Action::Connect | Action::End => {
                Err(ProtocolError::UnknownAction(envelope.action))
            }
        }
    }

    /// The wire action this request came from.
    pub fn action(&self) -> Action {
        match self {
            Self::Create => Action::Create,
            Self::Join { .. } => Action::Join,
            Self::Start { .. } => Action::Start,
            Self::Update { .. } => Action::Update,
        }
    }
}

fn payload<T: DeserializeOwned>(action: Action, data: serde_json::Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidMessage {
        action: action.as_str(),
        reason: e.to_string(),
    })
}
