//! Lifecycle controller: create, join, start, and paddle updates.
//!
//! Every operation validates first and mutates second, so a refused request
//! leaves the registry exactly as it found it.

use volley_protocol::{ClientId, SessionId};

use crate::{Broadcast, GameConfig, GameError, GameStatus, Notice, SessionRegistry, SessionTicker};

/// Applies client intent to sessions in the registry.
#[derive(Debug, Clone, Default)]
pub struct LifecycleController {
    config: GameConfig,
}

impl LifecycleController {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Allocates a session in `standby` with `requester` as player 1 and
    /// replies to the requester alone with the full snapshot.
    pub fn create(
        &self,
        registry: &mut SessionRegistry,
        requester: &ClientId,
        out: &mut dyn Broadcast,
    ) -> SessionId {
        let session = registry.create(&self.config);
        session.push_client(requester.clone());
        tracing::info!(session_id = %session.id, client_id = %requester, "game created");
        out.deliver(requester, &Notice::Created(session.clone()));
        session.id.clone()
    }

    /// Appends `requester` to the roster and tells the whole roster.
    ///
    /// # Errors
    /// - [`GameError::NotFound`]: no such session.
    /// - [`GameError::AlreadyStarted`]: the session has left `standby`.
    /// - [`GameError::RosterFull`]: two clients are already on the roster,
    ///   whoever the requester is.
    /// - [`GameError::AlreadyJoined`]: the requester is the lone roster member.
    pub fn join(
        &self,
        registry: &mut SessionRegistry,
        requester: &ClientId,
        game_id: &SessionId,
        out: &mut dyn Broadcast,
    ) -> Result<(), GameError> {
        let session = registry.get_mut(game_id)?;
        if session.status() != GameStatus::Standby {
            return Err(GameError::AlreadyStarted(game_id.clone()));
        }
        // Checked before membership so a full roster always reads as full.
        if session.is_full() {
            return Err(GameError::RosterFull(game_id.clone()));
        }
        if session.is_member(requester) {
            return Err(GameError::AlreadyJoined {
                client: requester.clone(),
                game: game_id.clone(),
            });
        }
        session.push_client(requester.clone());

        tracing::info!(
            session_id = %game_id,
            client_id = %requester,
            players = session.clients().len(),
            "player joined"
        );
        let notice = Notice::Joined {
            id: session.id.clone(),
            clients: session.clients().to_vec(),
            rules: *session.rules(),
        };
        out.broadcast(session.clients(), &notice);
        Ok(())
    }

    /// Moves a full session to `playing` and hands it to the ticker.
    ///
    /// Starting a session that is already `playing` succeeds without
    /// re-registering or re-announcing it.
    ///
    /// # Errors
    /// - [`GameError::NotFound`]: no such session.
    /// - [`GameError::Forbidden`]: the requester is not on the roster.
    /// - [`GameError::InsufficientPlayers`]: the roster does not hold two clients.
    /// - [`GameError::AlreadyStarted`]: the session has ended.
    pub fn start(
        &self,
        registry: &mut SessionRegistry,
        ticker: &mut SessionTicker,
        requester: &ClientId,
        game_id: &SessionId,
        out: &mut dyn Broadcast,
    ) -> Result<(), GameError> {
        let session = registry.get_mut(game_id)?;
        if !session.is_member(requester) {
            return Err(GameError::Forbidden {
                client: requester.clone(),
                game: game_id.clone(),
            });
        }
        if !session.is_full() {
            return Err(GameError::InsufficientPlayers {
                game: game_id.clone(),
                players: session.clients().len(),
            });
        }

        match session.status() {
            GameStatus::Playing => {
                tracing::debug!(session_id = %game_id, "start ignored, already playing");
                Ok(())
            }
            GameStatus::Ended => Err(GameError::AlreadyStarted(game_id.clone())),
            GameStatus::Standby => {
                session.advance_status(GameStatus::Playing);
                ticker.register(game_id.clone());
                tracing::info!(session_id = %game_id, client_id = %requester, "game started");
                out.broadcast(
                    session.clients(),
                    &Notice::Started {
                        game_id: game_id.clone(),
                    },
                );
                Ok(())
            }
        }
    }

    /// Moves the requester's paddle. Requests from clients outside the
    /// roster are ignored.
    ///
    /// # Errors
    /// [`GameError::NotFound`]: no such session.
    pub fn update(
        &self,
        registry: &mut SessionRegistry,
        requester: &ClientId,
        game_id: &SessionId,
        pos: f64,
    ) -> Result<(), GameError> {
        let session = registry.get_mut(game_id)?;
        match session.side_of(requester) {
            Some(side) => session.player_mut(side).position = pos,
            None => {
                tracing::trace!(session_id = %game_id, client_id = %requester, "update from non-member ignored");
            }
        }
        Ok(())
    }
}
