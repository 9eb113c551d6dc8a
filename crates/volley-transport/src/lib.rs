//! Transport layer for Volley.
//!
//! Provides the [`Transport`] trait for accepting connections and a
//! WebSocket implementation that upgrades requests on a single path.
//! Accepted connections are split into a [`FrameSink`] and a
//! [`FrameStream`] so that one task can write while another reads.

#![allow(async_fn_in_trait)]

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{FrameSink, FrameStream, WebSocketConnection, WebSocketTransport, DEFAULT_PATH};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for an accepted connection, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + 'static {
    /// The connection type produced by this transport.
    type Connection: Send + 'static;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, TransportError>;

    /// The address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}
