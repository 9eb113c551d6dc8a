//! The outbound boundary: what the core says, and the trait it says it through.
//!
//! The core never touches a socket. It describes each outgoing message as
//! a [`Notice`] and hands it to a [`Broadcast`] implementation together
//! with the recipients. Delivery is fire-and-forget from the core's side.

use serde::Serialize;
use volley_protocol::{Action, ClientId, SessionId};

use crate::{GameRules, Session, Side};

/// A message produced by the core for one or more clients.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Reply to `create`: the whole new session.
    Created(Session),
    /// Roster change after a successful `join`.
    Joined {
        id: SessionId,
        clients: Vec<ClientId>,
        rules: GameRules,
    },
    /// The session moved to `playing`.
    Started { game_id: SessionId },
    /// Post-tick snapshot.
    State(Session),
    /// The session moved to `ended`.
    Ended { winner: Side },
}

#[derive(Serialize)]
struct GamePayload<'a, T: Serialize> {
    game: &'a T,
}

#[derive(Serialize)]
struct RosterView<'a> {
    id: &'a SessionId,
    clients: &'a [ClientId],
    rules: &'a GameRules,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartPayload<'a> {
    game_id: &'a SessionId,
}

#[derive(Serialize)]
struct EndPayload {
    winner: Side,
}

impl Notice {
    /// The wire action this notice travels under.
    pub fn action(&self) -> Action {
        match self {
            Self::Created(_) => Action::Create,
            Self::Joined { .. } => Action::Join,
            Self::Started { .. } => Action::Start,
            Self::State(_) => Action::Update,
            Self::Ended { .. } => Action::End,
        }
    }

    /// The JSON `data` payload.
    ///
    /// | notice  | data                          |
    /// |---------|-------------------------------|
    /// | Created | `{game: Session}`             |
    /// | Joined  | `{game: {id, clients, rules}}`|
    /// | Started | `{gameId}`                    |
    /// | State   | `Session`                     |
    /// | Ended   | `{winner}`                    |
    pub fn data(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::Created(session) => serde_json::to_value(GamePayload { game: session }),
            Self::Joined { id, clients, rules } => serde_json::to_value(GamePayload {
                game: &RosterView { id, clients, rules },
            }),
            Self::Started { game_id } => serde_json::to_value(StartPayload { game_id }),
            Self::State(session) => serde_json::to_value(session),
            Self::Ended { winner } => serde_json::to_value(EndPayload { winner: *winner }),
        }
    }
}

/// Delivers notices to connected clients.
pub trait Broadcast {
    /// Sends one notice to one client. Unknown recipients are ignored.
    fn deliver(&mut self, recipient: &ClientId, notice: &Notice);

    /// Sends the same notice to every listed client, in order.
    fn broadcast(&mut self, recipients: &[ClientId], notice: &Notice) {
        for recipient in recipients {
            self.deliver(recipient, notice);
        }
    }
}

/// Records every delivery; handy wherever no real connections exist.
impl Broadcast for Vec<(ClientId, Notice)> {
    fn deliver(&mut self, recipient: &ClientId, notice: &Notice) {
        self.push((recipient.clone(), notice.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;

    fn session() -> Session {
        Session::new(SessionId::from("g-1"), GameConfig::default().rules, 1.05)
    }

    #[test]
    fn test_created_wraps_session_in_game() {
        let notice = Notice::Created(session());
        assert_eq!(notice.action(), Action::Create);
        let data = notice.data().unwrap();
        assert_eq!(data["game"]["id"], "g-1");
        assert_eq!(data["game"]["status"], "standby");
    }

    #[test]
    fn test_joined_carries_roster_and_rules_only() {
        let notice = Notice::Joined {
            id: SessionId::from("g-1"),
            clients: vec![ClientId::from("a"), ClientId::from("b")],
            rules: GameRules::default(),
        };
        let data = notice.data().unwrap();
        assert_eq!(data["game"]["id"], "g-1");
        assert_eq!(data["game"]["clients"][1], "b");
        assert_eq!(data["game"]["rules"]["paddleHeight"], 20.0);
        assert!(data["game"].get("ball").is_none());
    }

    #[test]
    fn test_started_and_ended_payloads() {
        let started = Notice::Started { game_id: SessionId::from("g-1") };
        assert_eq!(started.action(), Action::Start);
        assert_eq!(started.data().unwrap()["gameId"], "g-1");

        let ended = Notice::Ended { winner: Side::Player2 };
        assert_eq!(ended.action(), Action::End);
        assert_eq!(ended.data().unwrap()["winner"], "Player2");
    }

    #[test]
    fn test_state_is_the_bare_snapshot() {
        let notice = Notice::State(session());
        assert_eq!(notice.action(), Action::Update);
        let data = notice.data().unwrap();
        assert_eq!(data["ball"]["velocity"]["y"], 1.0);
        assert_eq!(data["player1"]["position"], 50.0);
    }

    #[test]
    fn test_broadcast_delivers_in_roster_order() {
        let mut out: Vec<(ClientId, Notice)> = Vec::new();
        let notice = Notice::Started { game_id: SessionId::from("g") };
        out.broadcast(&[ClientId::from("a"), ClientId::from("b")], &notice);
        let order: Vec<_> = out.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(order, ["a", "b"]);
    }
}
