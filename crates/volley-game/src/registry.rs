//! Session registry: the single owner of every live session.

use std::collections::HashMap;

use volley_protocol::SessionId;

use crate::{GameConfig, GameError, GameStatus, Session};

/// Decides which sessions the registry may drop.
///
/// The registry never removes a session on its own. An eviction policy is
/// consulted after every tick sweep; the default, [`RetainAll`], keeps
/// everything for the life of the process.
pub trait EvictionPolicy: Send {
    fn should_evict(&self, session: &Session) -> bool;
}

/// Never evicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetainAll;

impl EvictionPolicy for RetainAll {
    fn should_evict(&self, _session: &Session) -> bool {
        false
    }
}

/// Evicts sessions once they have ended.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvictEnded;

impl EvictionPolicy for EvictEnded {
    fn should_evict(&self, session: &Session) -> bool {
        session.status() == GameStatus::Ended
    }
}

impl<F> EvictionPolicy for F
where
    F: Fn(&Session) -> bool + Send,
{
    fn should_evict(&self, session: &Session) -> bool {
        self(session)
    }
}

/// All live sessions, keyed by id.
///
/// Not thread-safe by itself: the registry is owned by the coordinator
/// task, which serialises every access.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a session under a freshly generated id.
    pub fn create(&mut self, config: &GameConfig) -> &mut Session {
        let mut id = SessionId::random();
        while self.sessions.contains_key(&id) {
            id = SessionId::random();
        }
        let session = Session::new(id.clone(), config.rules, config.velocity_multiplier);
        tracing::debug!(session_id = %id, "session allocated");
        self.sessions.entry(id).or_insert(session)
    }

    /// # Errors
    /// [`GameError::NotFound`] if no session has this id.
    pub fn get(&self, id: &SessionId) -> Result<&Session, GameError> {
        self.sessions
            .get(id)
            .ok_or_else(|| GameError::NotFound(id.clone()))
    }

    /// # Errors
    /// [`GameError::NotFound`] if no session has this id.
    pub fn get_mut(&mut self, id: &SessionId) -> Result<&mut Session, GameError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| GameError::NotFound(id.clone()))
    }

    /// Stores `session` under its own id, returning whatever it replaced.
    pub fn put(&mut self, session: Session) -> Option<Session> {
        self.sessions.insert(session.id.clone(), session)
    }

    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        self.sessions.remove(id)
    }

    /// Drops every session the policy selects and returns their ids.
    pub fn evict(&mut self, policy: &dyn EvictionPolicy) -> Vec<SessionId> {
        let mut evicted = Vec::new();
        self.sessions.retain(|id, session| {
            if policy.should_evict(session) {
                evicted.push(id.clone());
                false
            } else {
                true
            }
        });
        for id in &evicted {
            tracing::info!(session_id = %id, "session evicted");
        }
        evicted
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_unique_ids() {
        let mut reg = SessionRegistry::new();
        let a = reg.create(&GameConfig::default()).id.clone();
        let b = reg.create(&GameConfig::default()).id.clone();
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
        assert!(reg.get(&a).is_ok());
    }

    #[test]
    fn test_create_applies_config() {
        let mut reg = SessionRegistry::new();
        let config = GameConfig {
            rules: crate::GameRules { max_score: 11, ..Default::default() },
            velocity_multiplier: 1.2,
        };
        let session = reg.create(&config);
        assert_eq!(session.rules().max_score, 11);
        assert_eq!(session.velocity_multiplier(), 1.2);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let reg = SessionRegistry::new();
        let err = reg.get(&SessionId::from("nope")).unwrap_err();
        assert_eq!(err, GameError::NotFound(SessionId::from("nope")));
    }

    #[test]
    fn test_put_replaces_in_place() {
        let mut reg = SessionRegistry::new();
        let mut copy = reg.create(&GameConfig::default()).clone();
        copy.player1.position = 10.0;
        assert!(reg.put(copy.clone()).is_some());
        assert_eq!(reg.get(&copy.id).unwrap().player1.position, 10.0);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_retain_all_never_evicts() {
        let mut reg = SessionRegistry::new();
        reg.create(&GameConfig::default());
        assert!(reg.evict(&RetainAll).is_empty());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_closure_policy_evicts_matching() {
        let mut reg = SessionRegistry::new();
        let keep = reg.create(&GameConfig::default()).id.clone();
        let drop = reg.create(&GameConfig::default()).id.clone();
        let target = drop.clone();
        let evicted = reg.evict(&move |s: &Session| s.id == target);
        assert_eq!(evicted, vec![drop.clone()]);
        assert!(reg.contains(&keep));
        assert!(!reg.contains(&drop));
    }

    #[test]
    fn test_evict_ended_keeps_live_sessions() {
        let mut reg = SessionRegistry::new();
        reg.create(&GameConfig::default());
        assert!(reg.evict(&EvictEnded).is_empty());
    }
}
