//! Integration tests for the WebSocket transport.
//!
//! A real listener on a loopback port, real `tokio-tungstenite` clients.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::{self, Message};
use volley_transport::{Transport, WebSocketTransport, DEFAULT_PATH};

type Client = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn bind() -> (WebSocketTransport, String) {
    let transport = WebSocketTransport::bind("127.0.0.1:0", DEFAULT_PATH)
        .await
        .expect("should bind");
    let addr = transport.local_addr().expect("has address").to_string();
    (transport, addr)
}

async fn connect(addr: &str, path: &str) -> Result<Client, tungstenite::Error> {
    tokio_tungstenite::connect_async(format!("ws://{addr}{path}"))
        .await
        .map(|(ws, _)| ws)
}

#[tokio::test]
async fn test_text_frames_flow_both_ways() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let mut client = connect(&addr, "/game").await.expect("client should connect");
    let conn = server.await.expect("task should complete");
    assert!(conn.id().into_inner() > 0);
    assert!(conn.peer_addr().ip().is_loopback());

    let (mut sink, mut stream) = conn.split();

    sink.send_text("hello from server".to_string()).await.unwrap();
    let msg = client.next().await.unwrap().unwrap();
    assert_eq!(msg.into_text().unwrap().as_str(), "hello from server");

    client.send(Message::text("hello from client")).await.unwrap();
    let data = stream.recv().await.unwrap().unwrap();
    assert_eq!(data, b"hello from client");

    client
        .send(Message::Binary(b"raw".to_vec().into()))
        .await
        .unwrap();
    assert_eq!(stream.recv().await.unwrap().unwrap(), b"raw");
}

#[tokio::test]
async fn test_halves_work_from_separate_tasks() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });
    let mut client = connect(&addr, "/game").await.unwrap();
    let (mut sink, mut stream) = server.await.unwrap().split();

    // The reader is parked in recv() while the writer sends.
    let reader = tokio::spawn(async move { stream.recv().await });
    sink.send_text("ping".into()).await.unwrap();
    assert_eq!(client.next().await.unwrap().unwrap().into_text().unwrap().as_str(), "ping");

    client.send(Message::text("pong")).await.unwrap();
    assert_eq!(reader.await.unwrap().unwrap().unwrap(), b"pong");
}

#[tokio::test]
async fn test_client_close_ends_stream() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });
    let mut client = connect(&addr, "/game").await.unwrap();
    let (_sink, mut stream) = server.await.unwrap().split();

    client.close(None).await.unwrap();
    assert!(stream.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_wrong_path_is_refused() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await });

    let err = connect(&addr, "/lobby").await.unwrap_err();
    match err {
        tungstenite::Error::Http(resp) => assert_eq!(resp.status().as_u16(), 404),
        other => panic!("expected HTTP 404, got {other:?}"),
    }
    assert!(server.await.unwrap().is_err());
}

#[tokio::test]
async fn test_bind_conflict_is_bind_error() {
    let (transport, addr) = bind().await;
    let err = WebSocketTransport::bind(&addr, DEFAULT_PATH).await.err().expect("port is taken");
    assert!(matches!(err, volley_transport::TransportError::Bind(_)));
    drop(transport);
}
