//! Connection table: the server's side of the broadcast boundary.

use std::collections::HashMap;

use tokio::sync::mpsc;
use volley_game::{Broadcast, Notice};
use volley_protocol::{ClientId, Envelope, JsonCodec};

/// Outbound text frames for one connection. The connection's writer task
/// holds the receiving end.
pub(crate) type Outbound = mpsc::UnboundedSender<String>;

/// Every live connection, keyed by the identity it was assigned.
#[derive(Debug, Default)]
pub(crate) struct ConnectionTable {
    senders: HashMap<ClientId, Outbound>,
    codec: JsonCodec,
}

impl ConnectionTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, client_id: ClientId, outbound: Outbound) {
        self.senders.insert(client_id, outbound);
    }

    pub(crate) fn remove(&mut self, client_id: &ClientId) -> bool {
        self.senders.remove(client_id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }

    /// Queues a raw text frame. Unknown or closed connections are skipped.
    pub(crate) fn send_text(&self, client_id: &ClientId, text: String) {
        if let Some(tx) = self.senders.get(client_id) {
            if tx.send(text).is_err() {
                tracing::trace!(%client_id, "outbound channel closed");
            }
        }
    }
}

impl Broadcast for ConnectionTable {
    fn deliver(&mut self, recipient: &ClientId, notice: &Notice) {
        if !self.senders.contains_key(recipient) {
            tracing::trace!(client_id = %recipient, action = %notice.action(), "recipient not connected");
            return;
        }
        let text = notice
            .data()
            .map(|data| Envelope::new(notice.action(), recipient.clone(), data))
            .map_err(volley_protocol::ProtocolError::Encode)
            .and_then(|envelope| self.codec.encode_text(&envelope));
        match text {
            Ok(text) => self.send_text(recipient, text),
            Err(e) => tracing::error!(client_id = %recipient, error = %e, "failed to encode notice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use volley_game::{GameRules, Side};
    use volley_protocol::SessionId;

    use super::*;

    #[test]
    fn test_envelope_is_addressed_to_each_recipient() {
        let mut table = ConnectionTable::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        table.insert(ClientId::from("a"), tx_a);
        table.insert(ClientId::from("b"), tx_b);

        let notice = Notice::Joined {
            id: SessionId::from("g"),
            clients: vec![ClientId::from("a"), ClientId::from("b")],
            rules: GameRules::default(),
        };
        table.broadcast(&[ClientId::from("a"), ClientId::from("b")], &notice);

        let a: serde_json::Value = serde_json::from_str(&rx_a.try_recv().unwrap()).unwrap();
        let b: serde_json::Value = serde_json::from_str(&rx_b.try_recv().unwrap()).unwrap();
        assert_eq!(a["action"], "join");
        assert_eq!(a["clientId"], "a");
        assert_eq!(b["clientId"], "b");
        assert_eq!(b["data"]["game"]["id"], "g");
    }

    #[test]
    fn test_missing_or_closed_recipients_are_skipped() {
        let mut table = ConnectionTable::new();
        let (tx, rx) = mpsc::unbounded_channel();
        table.insert(ClientId::from("gone"), tx);
        drop(rx);

        let notice = Notice::Ended { winner: Side::Player1 };
        table.deliver(&ClientId::from("gone"), &notice);
        table.deliver(&ClientId::from("never"), &notice);
        assert_eq!(table.len(), 1);
        assert!(table.remove(&ClientId::from("gone")));
        assert!(!table.remove(&ClientId::from("gone")));
    }

    #[test]
    fn test_send_text_is_raw() {
        let mut table = ConnectionTable::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        table.insert(ClientId::from("a"), tx);
        table.send_text(&ClientId::from("a"), "game x not found".into());
        assert_eq!(rx.try_recv().unwrap(), "game x not found");
    }
}
