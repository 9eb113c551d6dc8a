//! Per-connection handler: greeting, frame decoding, and request routing.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Assign a [`ClientId`] and queue the `connect` greeting
//!   2. Register the outbound channel with the coordinator
//!   3. Loop: receive frames, decode, forward requests
//!
//! Outbound frames are written by a separate writer task that drains the
//! connection's channel, so a slow reader never stalls the coordinator.

use std::time::Duration;

use tokio::sync::mpsc;
use volley_protocol::{Codec, ClientId, Envelope, JsonCodec};
use volley_transport::{FrameSink, FrameStream, WebSocketConnection};

use crate::coordinator::CoordinatorHandle;
use crate::VolleyError;

/// Drop guard that unregisters the connection when the handler exits,
/// whichever way it exits.
struct ConnectionGuard {
    client_id: ClientId,
    coordinator: CoordinatorHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.coordinator.disconnect_now(self.client_id.clone());
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    coordinator: CoordinatorHandle,
    idle_timeout: Option<Duration>,
) -> Result<(), VolleyError> {
    let conn_id = conn.id();
    let client_id = ClientId::random();
    let codec = JsonCodec;
    tracing::info!(%conn_id, %client_id, peer = %conn.peer_addr(), "client connected");

    let (sink, mut stream) = conn.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_frames(sink, rx));

    // The greeting is queued before registration so it is always the
    // first frame the client sees.
    let _ = tx.send(codec.encode_text(&Envelope::connect(client_id.clone()))?);
    coordinator.connect(client_id.clone(), tx.clone()).await?;
    let guard = ConnectionGuard {
        client_id: client_id.clone(),
        coordinator: coordinator.clone(),
    };

    while let Some(data) = next_frame(&mut stream, &client_id, idle_timeout).await {
        match codec.decode_request(&data) {
            Ok(request) => coordinator.request(client_id.clone(), request).await?,
            Err(e) => {
                tracing::debug!(%client_id, error = %e, "rejected inbound frame");
                let _ = tx.send(e.to_string());
            }
        }
    }

    tracing::info!(%client_id, "client disconnected");
    drop(guard);
    drop(tx);
    let _ = writer.await;
    Ok(())
}

/// Reads the next frame, or `None` when the connection should end.
async fn next_frame(
    stream: &mut FrameStream,
    client_id: &ClientId,
    idle_timeout: Option<Duration>,
) -> Option<Vec<u8>> {
    let received = match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, stream.recv()).await {
            Ok(received) => received,
            Err(_) => {
                tracing::info!(%client_id, "connection idle, closing");
                return None;
            }
        },
        None => stream.recv().await,
    };
    match received {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(%client_id, error = %e, "recv error");
            None
        }
    }
}

/// Writes queued frames until every sender is gone or the socket fails.
async fn write_frames(mut sink: FrameSink, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(text) = rx.recv().await {
        if let Err(e) = sink.send_text(text).await {
            tracing::debug!(conn_id = %sink.id(), error = %e, "send failed");
            return;
        }
    }
    let _ = sink.close().await;
}
