//! Wire protocol for Volley.
//!
//! This crate defines what travels between a browser client and the
//! server:
//!
//! - **Identity** ([`ClientId`], [`SessionId`]): opaque string handles
//!   for a connection and for a game session.
//! - **Envelope** ([`Envelope`], [`Action`]): the `{action, clientId, data}`
//!   shape shared by both directions.
//! - **Requests** ([`ClientRequest`]): the typed view of an inbound
//!   envelope that the game layer consumes.
//! - **Codec** ([`Codec`], [`JsonCodec`]): bytes in, types out.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about sessions, physics, or sockets.
//!
//! ```text
//! Transport (frames) → Protocol (Envelope / ClientRequest) → Game (sessions)
//! ```

mod codec;
mod error;
mod request;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use request::{ClientRequest, GameRef, PositionUpdate};
pub use types::{Action, ClientId, Envelope, SessionId};
