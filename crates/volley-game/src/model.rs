//! The session record: roster, rules, ball, paddles, and status.
//!
//! A [`Session`] is owned by the [`SessionRegistry`](crate::SessionRegistry)
//! and mutated in place by two parties only: the lifecycle controller
//! (roster, paddle positions, `standby → playing`) and the simulation
//! engine (ball, scores, `playing → ended`). The roster and status are
//! private so that neither can be pushed into an illegal state from
//! outside the crate.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use volley_protocol::{ClientId, SessionId};

use crate::config::{FIELD_MAX, FIELD_MIN};
use crate::{GameRules, GameStatus};

/// Maximum roster size.
pub const MAX_PLAYERS: usize = 2;

const CENTER: f64 = (FIELD_MIN + FIELD_MAX) / 2.0;

/// A position or a per-tick velocity on the playfield.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub position: Vector2D,
    pub velocity: Vector2D,
}

impl Default for BallState {
    /// Centre court, heading down-right at unit speed.
    fn default() -> Self {
        Self {
            position: Vector2D::new(CENTER, CENTER),
            velocity: Vector2D::new(1.0, 1.0),
        }
    }
}

/// One paddle and its owner's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Paddle centre on the y axis.
    pub position: f64,
    pub score: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self { position: CENTER, score: 0 }
    }
}

/// A roster slot. `Player1` defends x = 0, `Player2` defends x = 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    /// Slot index in the roster.
    pub fn index(self) -> usize {
        match self {
            Self::Player1 => 0,
            Self::Player2 => 1,
        }
    }
}

/// One match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    clients: Vec<ClientId>,
    rules: GameRules,
    status: GameStatus,
    pub ball: BallState,
    pub player1: PlayerState,
    pub player2: PlayerState,
    velocity_multiplier: f64,
}

impl Session {
    /// A fresh session in `standby` with an empty roster.
    pub fn new(id: SessionId, rules: GameRules, velocity_multiplier: f64) -> Self {
        Self {
            id,
            clients: Vec::with_capacity(MAX_PLAYERS),
            rules,
            status: GameStatus::Standby,
            ball: BallState::default(),
            player1: PlayerState::default(),
            player2: PlayerState::default(),
            velocity_multiplier,
        }
    }

    /// The roster. `clients()[0]` is player 1, `clients()[1]` is player 2.
    pub fn clients(&self) -> &[ClientId] {
        &self.clients
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn velocity_multiplier(&self) -> f64 {
        self.velocity_multiplier
    }

    pub fn is_full(&self) -> bool {
        self.clients.len() >= MAX_PLAYERS
    }

    pub fn is_member(&self, client: &ClientId) -> bool {
        self.clients.contains(client)
    }

    /// Which slot `client` occupies, if any.
    pub fn side_of(&self, client: &ClientId) -> Option<Side> {
        match self.clients.iter().position(|c| c == client)? {
            0 => Some(Side::Player1),
            _ => Some(Side::Player2),
        }
    }

    pub fn player(&self, side: Side) -> &PlayerState {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }

    pub fn player_mut(&mut self, side: Side) -> &mut PlayerState {
        match side {
            Side::Player1 => &mut self.player1,
            Side::Player2 => &mut self.player2,
        }
    }

    /// The side whose score has reached `maxScore`, if either has.
    pub fn winner(&self) -> Option<Side> {
        let max = self.rules.max_score;
        if self.player1.score == max {
            Some(Side::Player1)
        } else if self.player2.score == max {
            Some(Side::Player2)
        } else {
            None
        }
    }

    /// Appends a client to the roster. Returns `false` if the roster is full.
    pub(crate) fn push_client(&mut self, client: ClientId) -> bool {
        if self.is_full() {
            return false;
        }
        self.clients.push(client);
        true
    }

    /// Moves the status forward. Returns `false`, leaving the status
    /// untouched, if `next` is not the immediate successor.
    pub(crate) fn advance_status(&mut self, next: GameStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(SessionId::from("s"), GameRules::default(), 1.05)
    }

    #[test]
    fn test_new_session_defaults() {
        let s = session();
        assert_eq!(s.status(), GameStatus::Standby);
        assert!(s.clients().is_empty());
        assert_eq!(s.ball.position, Vector2D::new(50.0, 50.0));
        assert_eq!(s.ball.velocity, Vector2D::new(1.0, 1.0));
        assert_eq!(s.player1, PlayerState { position: 50.0, score: 0 });
        assert_eq!(s.player2, PlayerState { position: 50.0, score: 0 });
    }

    #[test]
    fn test_roster_caps_at_two_and_keeps_order() {
        let mut s = session();
        assert!(s.push_client(ClientId::from("a")));
        assert!(s.push_client(ClientId::from("b")));
        assert!(!s.push_client(ClientId::from("c")));
        assert_eq!(s.clients(), &[ClientId::from("a"), ClientId::from("b")]);
        assert_eq!(s.side_of(&ClientId::from("a")), Some(Side::Player1));
        assert_eq!(s.side_of(&ClientId::from("b")), Some(Side::Player2));
        assert_eq!(s.side_of(&ClientId::from("c")), None);
    }

    #[test]
    fn test_status_cannot_skip_or_go_back() {
        let mut s = session();
        assert!(!s.advance_status(GameStatus::Ended));
        assert!(s.advance_status(GameStatus::Playing));
        assert!(!s.advance_status(GameStatus::Standby));
        assert!(s.advance_status(GameStatus::Ended));
        assert!(!s.advance_status(GameStatus::Playing));
        assert_eq!(s.status(), GameStatus::Ended);
    }

    #[test]
    fn test_winner_reads_scores() {
        let mut s = session();
        assert_eq!(s.winner(), None);
        s.player2.score = 5;
        assert_eq!(s.winner(), Some(Side::Player2));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut s = session();
        s.push_client(ClientId::from("a"));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["id"], "s");
        assert_eq!(json["clients"][0], "a");
        assert_eq!(json["status"], "standby");
        assert_eq!(json["rules"]["maxScore"], 5);
        assert_eq!(json["ball"]["position"]["x"], 50.0);
        assert_eq!(json["player2"]["score"], 0);
        assert_eq!(json["velocityMultiplier"], 1.05);
    }

    #[test]
    fn test_snapshot_survives_serialization() {
        let mut s = session();
        s.push_client(ClientId::from("a"));
        s.push_client(ClientId::from("b"));
        s.advance_status(GameStatus::Playing);
        s.ball.position = Vector2D::new(12.25, 87.5);
        s.ball.velocity = Vector2D::new(-1.1025, 1.05);
        s.player1 = PlayerState { position: 33.0, score: 2 };

        let text = serde_json::to_string(&s).unwrap();
        let back: Session = serde_json::from_str(&text).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.clients(), s.clients());
        assert_eq!(back.rules(), s.rules());
    }
}
