//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::{ConnectionId, Transport, TransportError};

/// Path upgraded when none is configured.
pub const DEFAULT_PATH: &str = "/game";

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// A WebSocket [`Transport`] that only upgrades requests for one path.
pub struct WebSocketTransport {
    listener: TcpListener,
    path: String,
}

impl WebSocketTransport {
    /// Binds to `addr` and upgrades requests for `path`. Any other path
    /// is answered with `404 Not Found` and never becomes a connection.
    pub async fn bind(addr: &str, path: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(TransportError::Bind)?;
        tracing::info!(addr, path, "WebSocket transport listening");
        Ok(Self {
            listener,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn not_found() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("not found".to_string()));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;

    async fn accept(&mut self) -> Result<WebSocketConnection, TransportError> {
        let (stream, peer) = self.listener.accept().await.map_err(TransportError::Accept)?;

        let path = self.path.as_str();
        let check_path = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            if req.uri().path() == path {
                Ok(resp)
            } else {
                tracing::debug!(%peer, requested = req.uri().path(), "refusing upgrade on unknown path");
                Err(not_found())
            }
        };
        let ws = tokio_tungstenite::accept_hdr_async(stream, check_path)
            .await
            .map_err(TransportError::Handshake)?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "accepted WebSocket connection");
        Ok(WebSocketConnection { id, peer, ws })
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(TransportError::Bind)
    }
}

/// A single upgraded WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    ws: WsStream,
}

impl WebSocketConnection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Splits the connection into independent write and read halves.
    pub fn split(self) -> (FrameSink, FrameStream) {
        let (sink, stream) = self.ws.split();
        (
            FrameSink { id: self.id, sink },
            FrameStream { id: self.id, stream },
        )
    }
}

/// The write half of a connection.
pub struct FrameSink {
    id: ConnectionId,
    sink: SplitSink<WsStream, Message>,
}

impl FrameSink {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Sends one text frame.
    pub async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.sink.send(Message::text(text)).await.map_err(TransportError::Send)
    }

    /// Sends a close frame and flushes.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        match self.sink.close().await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(TransportError::Send(e)),
        }
    }
}

/// The read half of a connection.
pub struct FrameStream {
    id: ConnectionId,
    stream: SplitStream<WsStream>,
}

impl FrameStream {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Receives the payload of the next text or binary frame.
    ///
    /// Control frames are skipped. Returns `Ok(None)` once the peer has
    /// closed the connection.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_bytes().to_vec())),
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed)) => {
                    return Ok(None);
                }
                Some(Err(e)) => return Err(TransportError::Receive(e)),
            }
        }
    }
}
