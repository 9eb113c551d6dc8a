//! Per-session rules and the session status state machine.

use serde::{Deserialize, Serialize};

use crate::GameError;

/// Lowest coordinate on both axes of the playfield.
pub const FIELD_MIN: f64 = 0.0;
/// Highest coordinate on both axes of the playfield.
pub const FIELD_MAX: f64 = 100.0;
/// Gap between a goal line and the back of a paddle.
pub const PADDLE_INSET: f64 = 1.0;
/// Factor applied to the ball velocity on every paddle hit.
pub const DEFAULT_VELOCITY_MULTIPLIER: f64 = 1.05;

// ---------------------------------------------------------------------------
// GameRules
// ---------------------------------------------------------------------------

/// The rules a session is created with. Immutable for the session's life.
///
/// All sizes are in playfield units (the field is 100 × 100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRules {
    /// First player to reach this score wins.
    pub max_score: u32,
    /// Paddle thickness along the x axis.
    pub paddle_width: f64,
    /// Paddle length along the y axis.
    pub paddle_height: f64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_score: 5,
            paddle_width: 2.0,
            paddle_height: 20.0,
        }
    }
}

impl GameRules {
    /// Checks the rules are playable.
    ///
    /// # Errors
    /// [`GameError::InvalidRules`] if `max_score` is zero or a paddle
    /// dimension is outside the open interval (0, 100).
    pub fn validated(self) -> Result<Self, GameError> {
        if self.max_score == 0 {
            return Err(GameError::InvalidRules("maxScore must be at least 1".into()));
        }
        for (name, value) in [("paddleWidth", self.paddle_width), ("paddleHeight", self.paddle_height)] {
            if !(value > FIELD_MIN && value < FIELD_MAX) {
                return Err(GameError::InvalidRules(format!(
                    "{name} must be inside (0, 100), got {value}"
                )));
            }
        }
        Ok(self)
    }

    /// x coordinate at or beyond which the ball meets player 2's paddle.
    pub fn right_paddle_face(&self) -> f64 {
        FIELD_MAX - PADDLE_INSET - self.paddle_width
    }

    /// x coordinate at or before which the ball meets player 1's paddle.
    pub fn left_paddle_face(&self) -> f64 {
        FIELD_MIN + PADDLE_INSET + self.paddle_width
    }

    /// Whether `y` lies on a paddle centred at `center` (edges inclusive).
    pub fn covers(&self, center: f64, y: f64) -> bool {
        let half = self.paddle_height / 2.0;
        y >= center - half && y <= center + half
    }
}

/// What the lifecycle controller stamps onto every new session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub rules: GameRules,
    pub velocity_multiplier: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rules: GameRules::default(),
            velocity_multiplier: DEFAULT_VELOCITY_MULTIPLIER,
        }
    }
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Where a session is in its life.
///
/// Transitions only move forward:
///
/// ```text
/// Standby → Playing → Ended
/// ```
///
/// - **Standby**: created, roster filling up. Joins are accepted.
/// - **Playing**: two players, the tick sweep advances the ball.
/// - **Ended**: someone reached `maxScore`. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Standby,
    Playing,
    Ended,
}

impl GameStatus {
    /// The only state reachable from this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Standby => Some(Self::Playing),
            Self::Playing => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Standby => "standby",
            Self::Playing => "playing",
            Self::Ended => "ended",
        })
    }
}
