//! Error types for session lifecycle operations.

use volley_protocol::{ClientId, SessionId};

/// Why a lifecycle action was refused.
///
/// Every variant is a synchronous validation failure. The session named
/// in the error is left exactly as it was, and the `Display` text is what
/// the requesting client receives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    /// No session with this id is registered.
    #[error("game {0} not found")]
    NotFound(SessionId),

    /// The requester is not on the session's roster.
    #[error("client {client} has no permission to start game {game}")]
    Forbidden { client: ClientId, game: SessionId },

    /// The session has left `standby`.
    #[error("game {0} has already started")]
    AlreadyStarted(SessionId),

    /// The roster already holds two clients.
    #[error("game {0} is full, max players is 2")]
    RosterFull(SessionId),

    /// `start` needs exactly two clients on the roster.
    #[error("game {game} needs 2 players to start, has {players}")]
    InsufficientPlayers { game: SessionId, players: usize },

    /// The requester is already on this roster.
    #[error("client {client} already joined game {game}")]
    AlreadyJoined { client: ClientId, game: SessionId },

    /// Session rules failed validation.
    #[error("invalid game rules: {0}")]
    InvalidRules(String),
}
