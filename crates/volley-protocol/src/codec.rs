//! Codec trait and the JSON implementation.
//!
//! The browser client speaks JSON text frames, so [`JsonCodec`] is the
//! only implementation. The trait stays so the server and its tests are
//! written against an interface rather than `serde_json` directly.

use serde::{de::DeserializeOwned, Serialize};

use crate::{ClientRequest, Envelope, ProtocolError};

/// Encodes Rust values to bytes and decodes them back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] for malformed or mis-shaped input.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes a raw inbound frame all the way to a [`ClientRequest`].
    fn decode_request(&self, data: &[u8]) -> Result<ClientRequest, ProtocolError> {
        let envelope: Envelope = self.decode(data)?;
        ClientRequest::from_envelope(envelope)
    }
}

/// A [`Codec`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Encodes to a `String`, for transports that send text frames.
    pub fn encode_text<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }
}

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
