//! Error types for the protocol layer.

/// Errors that can occur while turning frames into messages and back.
///
/// Every variant here is a client-side mistake or a serialization bug;
/// none of them affect session state. The server reports them to the
/// sending connection and carries on.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The frame was not valid JSON, or did not have the envelope shape.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The `action` field named something the server does not accept
    /// from a client.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The envelope parsed but its `data` is missing fields or has the
    /// wrong types for the action.
    #[error("invalid {action} message: {reason}")]
    InvalidMessage {
        action: &'static str,
        reason: String,
    },
}
