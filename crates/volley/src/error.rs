//! Unified error type for the Volley server.

use volley_game::GameError;
use volley_protocol::ProtocolError;
use volley_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapped variant lets `?` convert
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum VolleyError {
    /// A transport-level error (bind, handshake, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, unknown action).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-level error (lifecycle refusal, invalid rules).
    #[error(transparent)]
    Game(#[from] GameError),

    /// The coordinator task has stopped and no longer takes commands.
    #[error("game coordinator is no longer running")]
    Unavailable,
}
