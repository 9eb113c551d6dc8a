use tokio_tungstenite::tungstenite;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener or reading its address failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The WebSocket upgrade was refused or broke off.
    #[error("handshake failed: {0}")]
    Handshake(#[source] tungstenite::Error),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    Receive(#[source] tungstenite::Error),
}
