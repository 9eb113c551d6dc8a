//! Session ticker: the per-tick sweep over every playing session.
//!
//! The ticker holds no clock. Whoever owns it decides when a tick happens
//! and calls [`SessionTicker::tick`]; in the server that is the coordinator
//! reacting to its tick clock, in tests it is the test itself.

use std::collections::HashSet;

use rand::Rng;
use volley_protocol::SessionId;

use crate::{engine, Broadcast, Notice, SessionRegistry};

/// Summary of one sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Sessions advanced this tick, in registration order.
    pub advanced: Vec<SessionId>,
    /// Sessions that ended this tick and were retired.
    pub ended: Vec<SessionId>,
}

#[derive(Debug)]
pub struct SessionTicker {
    /// Registered sessions in registration order.
    active: Vec<SessionId>,
    /// Sessions that ended and are still in the registry. They can never be
    /// registered again.
    retired: HashSet<SessionId>,
    running: bool,
}

impl Default for SessionTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTicker {
    /// A running ticker with nothing registered.
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            retired: HashSet::new(),
            running: true,
        }
    }

    /// Adds a session to the sweep. Returns `false` if it was already
    /// registered or has been retired.
    pub fn register(&mut self, id: SessionId) -> bool {
        if self.retired.contains(&id) || self.active.contains(&id) {
            return false;
        }
        tracing::debug!(session_id = %id, "session registered for ticks");
        self.active.push(id);
        true
    }

    pub fn is_registered(&self, id: &SessionId) -> bool {
        self.active.contains(id)
    }

    pub fn is_retired(&self, id: &SessionId) -> bool {
        self.retired.contains(id)
    }

    /// Drops every trace of a session that has left the registry.
    pub fn forget(&mut self, id: &SessionId) {
        self.active.retain(|a| a != id);
        self.retired.remove(id);
    }

    /// Number of retired sessions still remembered.
    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Pauses the sweep. Registrations are kept.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances every registered, playing session by one step and
    /// broadcasts the resulting snapshot to its roster.
    ///
    /// A session that ends this tick gets its final snapshot, then the
    /// `end` notice, and is retired. Registered ids that have vanished from
    /// the registry are dropped from the sweep. A stopped ticker does
    /// nothing.
    pub fn tick<R: Rng>(
        &mut self,
        registry: &mut SessionRegistry,
        rng: &mut R,
        out: &mut dyn Broadcast,
    ) -> TickReport {
        let mut report = TickReport::default();
        if !self.running {
            return report;
        }

        let mut retire = Vec::new();
        for id in &self.active {
            let Ok(session) = registry.get_mut(id) else {
                tracing::debug!(session_id = %id, "registered session vanished");
                retire.push((id.clone(), false));
                continue;
            };
            let Some(outcome) = engine::advance(session, rng) else {
                continue;
            };

            out.broadcast(session.clients(), &Notice::State(session.clone()));
            report.advanced.push(id.clone());

            if outcome.ended {
                if let Some(winner) = session.winner() {
                    out.broadcast(session.clients(), &Notice::Ended { winner });
                }
                tracing::info!(
                    session_id = %id,
                    p1 = session.player1.score,
                    p2 = session.player2.score,
                    "game ended"
                );
                retire.push((id.clone(), true));
                report.ended.push(id.clone());
            }
        }

        for (id, ended) in retire {
            self.active.retain(|a| a != &id);
            if ended {
                self.retired.insert(id);
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use volley_protocol::ClientId;

    use super::*;
    use crate::{GameConfig, GameRules, LifecycleController, Side};

    fn playing_game(reg: &mut SessionRegistry, ticker: &mut SessionTicker, rules: GameRules) -> SessionId {
        let ctl = LifecycleController::new(GameConfig { rules, ..GameConfig::default() });
        let mut sink: Vec<(ClientId, Notice)> = Vec::new();
        let id = ctl.create(reg, &ClientId::from("a"), &mut sink);
        ctl.join(reg, &ClientId::from("b"), &id, &mut sink).unwrap();
        ctl.start(reg, ticker, &ClientId::from("a"), &id, &mut sink).unwrap();
        id
    }

    #[test]
    fn test_tick_broadcasts_state_to_roster() {
        let mut reg = SessionRegistry::new();
        let mut ticker = SessionTicker::new();
        let id = playing_game(&mut reg, &mut ticker, GameRules::default());
        let mut out: Vec<(ClientId, Notice)> = Vec::new();

        let report = ticker.tick(&mut reg, &mut StdRng::seed_from_u64(1), &mut out);
        assert_eq!(report.advanced, vec![id.clone()]);
        assert!(report.ended.is_empty());
        assert_eq!(out.len(), 2);
        match &out[0].1 {
            Notice::State(s) => assert_eq!(s.ball.position.x, 51.0),
            other => panic!("expected State, got {other:?}"),
        }
    }

    #[test]
    fn test_standby_sessions_are_not_swept() {
        let mut reg = SessionRegistry::new();
        let mut ticker = SessionTicker::new();
        let id = reg.create(&GameConfig::default()).id.clone();
        // Registered by hand while still in standby.
        assert!(ticker.register(id.clone()));
        let mut out: Vec<(ClientId, Notice)> = Vec::new();

        let report = ticker.tick(&mut reg, &mut StdRng::seed_from_u64(1), &mut out);
        assert!(report.advanced.is_empty());
        assert!(out.is_empty());
        assert!(ticker.is_registered(&id));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut ticker = SessionTicker::new();
        assert!(ticker.register(SessionId::from("x")));
        assert!(!ticker.register(SessionId::from("x")));
        assert_eq!(ticker.len(), 1);
    }

    #[test]
    fn test_terminal_tick_sends_state_then_end_and_retires() {
        let mut reg = SessionRegistry::new();
        let mut ticker = SessionTicker::new();
        let id = playing_game(&mut reg, &mut ticker, GameRules { max_score: 1, ..GameRules::default() });
        {
            let s = reg.get_mut(&id).unwrap();
            s.player2.position = 0.0;
            s.ball.position.x = 99.5;
            s.ball.velocity.x = 1.0;
        }
        let mut out: Vec<(ClientId, Notice)> = Vec::new();
        let report = ticker.tick(&mut reg, &mut StdRng::seed_from_u64(1), &mut out);

        assert_eq!(report.ended, vec![id.clone()]);
        let kinds: Vec<_> = out.iter().map(|(to, n)| (to.as_str(), n.action().as_str())).collect();
        assert_eq!(
            kinds,
            [("a", "update"), ("b", "update"), ("a", "end"), ("b", "end")]
        );
        assert!(matches!(out[2].1, Notice::Ended { winner: Side::Player1 }));

        assert!(!ticker.is_registered(&id));
        assert!(ticker.is_retired(&id));
        assert!(!ticker.register(id.clone()));

        out.clear();
        let report = ticker.tick(&mut reg, &mut StdRng::seed_from_u64(1), &mut out);
        assert!(report.advanced.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_vanished_session_is_dropped() {
        let mut reg = SessionRegistry::new();
        let mut ticker = SessionTicker::new();
        let id = playing_game(&mut reg, &mut ticker, GameRules::default());
        reg.remove(&id);

        let mut out: Vec<(ClientId, Notice)> = Vec::new();
        ticker.tick(&mut reg, &mut StdRng::seed_from_u64(1), &mut out);
        assert!(ticker.is_empty());
        assert!(!ticker.is_retired(&id));
    }

    #[test]
    fn test_forget_clears_retired_id() {
        let mut ticker = SessionTicker::new();
        let id = SessionId::from("x");
        ticker.register(id.clone());
        ticker.forget(&id);
        assert!(ticker.is_empty());

        ticker.retired.insert(id.clone());
        ticker.forget(&id);
        assert!(!ticker.is_retired(&id));
        assert_eq!(ticker.retired_len(), 0);
    }

    #[test]
    fn test_stopped_ticker_freezes_sessions() {
        let mut reg = SessionRegistry::new();
        let mut ticker = SessionTicker::new();
        let id = playing_game(&mut reg, &mut ticker, GameRules::default());
        ticker.stop();

        let mut out: Vec<(ClientId, Notice)> = Vec::new();
        let report = ticker.tick(&mut reg, &mut StdRng::seed_from_u64(1), &mut out);
        assert!(report.advanced.is_empty());
        assert_eq!(reg.get(&id).unwrap().ball.position.x, 50.0);

        ticker.start();
        let report = ticker.tick(&mut reg, &mut StdRng::seed_from_u64(1), &mut out);
        assert_eq!(report.advanced, vec![id]);
    }
}
