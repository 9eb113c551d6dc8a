//! Simulation engine: advances one session by one tick.
//!
//! A tick runs these steps in order, every time:
//!
//! 1. **Integrate**: `position += velocity`, using the velocity the ball
//!    entered the tick with.
//! 2. **Walls**: at or past y = 0 or y = 100, flip `velocity.y`. The
//!    position is not clamped, so the ball may sit just outside the field
//!    for one tick.
//! 3. **Paddles**: at or past a paddle face and within the paddle's
//!    span, reflect x and scale both components by the session's velocity
//!    multiplier. The reflection is computed from the velocity the ball
//!    entered the tick with, so it replaces any wall flip from step 2.
//! 4. **Scoring**: at or past x = 0 player 2 scores; at or past x = 100
//!    player 1 scores.
//! 5. **Termination**: a score that reaches `maxScore` ends the session.
//! 6. **Serve**: after any score, including the final one, the ball goes
//!    back to x = 50 at a random height with a random diagonal heading.

use rand::Rng;

use crate::config::{FIELD_MAX, FIELD_MIN};
use crate::{BallState, GameStatus, Session, Side, Vector2D};

/// What happened during one call to [`advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    pub wall_bounce: bool,
    pub paddle_hit: bool,
    /// The side that scored this tick.
    pub scorer: Option<Side>,
    /// `true` on the tick the session moved to `ended`.
    pub ended: bool,
}

/// Advances `session` by one tick.
///
/// Returns `None` without touching the session unless it is `playing`.
pub fn advance<R: Rng>(session: &mut Session, rng: &mut R) -> Option<StepOutcome> {
    if session.status() != GameStatus::Playing {
        return None;
    }

    let rules = *session.rules();
    let entry_velocity = session.ball.velocity;
    let mut outcome = StepOutcome::default();

    session.ball.position += entry_velocity;
    let pos = session.ball.position;

    if pos.y <= FIELD_MIN || pos.y >= FIELD_MAX {
        session.ball.velocity.y = -entry_velocity.y;
        outcome.wall_bounce = true;
    }

    let hits_right = pos.x >= rules.right_paddle_face() && rules.covers(session.player2.position, pos.y);
    let hits_left = pos.x <= rules.left_paddle_face() && rules.covers(session.player1.position, pos.y);
    if hits_right || hits_left {
        let m = session.velocity_multiplier();
        session.ball.velocity = Vector2D::new(-entry_velocity.x * m, entry_velocity.y * m);
        outcome.paddle_hit = true;
    }

    outcome.scorer = if pos.x <= FIELD_MIN {
        Some(Side::Player2)
    } else if pos.x >= FIELD_MAX {
        Some(Side::Player1)
    } else {
        None
    };

    if let Some(side) = outcome.scorer {
        session.player_mut(side).score += 1;
        if session.winner().is_some() {
            outcome.ended = session.advance_status(GameStatus::Ended);
        }
        serve(&mut session.ball, rng);
        tracing::debug!(
            session_id = %session.id,
            scorer = ?side,
            p1 = session.player1.score,
            p2 = session.player2.score,
            "point scored"
        );
    }

    Some(outcome)
}

/// Puts the ball back at centre court with a fresh random heading.
pub fn serve<R: Rng>(ball: &mut BallState, rng: &mut R) {
    let mut unit = || if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let velocity = Vector2D::new(unit(), unit());
    let y = rng.random_range(FIELD_MIN..=FIELD_MAX);
    ball.position = Vector2D::new((FIELD_MIN + FIELD_MAX) / 2.0, y);
    ball.velocity = velocity;
}
