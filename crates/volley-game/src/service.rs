//! The coordinating object that owns all session state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use volley_protocol::{ClientId, ClientRequest};

use crate::{
    Broadcast, EvictionPolicy, GameConfig, GameError, LifecycleController, RetainAll, SessionRegistry,
    SessionTicker, TickReport,
};

/// Registry, controller, ticker, eviction policy and RNG in one place.
///
/// `GameService` is not shared. One task owns it and calls
/// [`handle`](Self::handle) and [`tick`](Self::tick) in turn, which is
/// what keeps every session mutation serialised.
pub struct GameService<R = StdRng> {
    registry: SessionRegistry,
    controller: LifecycleController,
    ticker: SessionTicker,
    eviction: Box<dyn EvictionPolicy>,
    rng: R,
}

impl GameService<StdRng> {
    /// A service seeded from the operating system.
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }
}

impl<R: Rng> GameService<R> {
    /// A service drawing serve angles from `rng`.
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self {
            registry: SessionRegistry::new(),
            controller: LifecycleController::new(config),
            ticker: SessionTicker::new(),
            eviction: Box::new(RetainAll),
            rng,
        }
    }

    /// Replaces the eviction policy consulted after every tick.
    pub fn with_eviction(mut self, policy: impl EvictionPolicy + 'static) -> Self {
        self.eviction = Box::new(policy);
        self
    }

    /// Applies one client request.
    ///
    /// # Errors
    /// Whatever the lifecycle controller refuses with. Nothing is changed
    /// and nothing is broadcast when an error is returned.
    pub fn handle(
        &mut self,
        requester: &ClientId,
        request: ClientRequest,
        out: &mut dyn Broadcast,
    ) -> Result<(), GameError> {
        let ctl = &self.controller;
        match request {
            ClientRequest::Create => {
                ctl.create(&mut self.registry, requester, out);
                Ok(())
            }
            ClientRequest::Join { game_id } => ctl.join(&mut self.registry, requester, &game_id, out),
            ClientRequest::Start { game_id } => {
                ctl.start(&mut self.registry, &mut self.ticker, requester, &game_id, out)
            }
            ClientRequest::Update { game_id, pos } => ctl.update(&mut self.registry, requester, &game_id, pos),
        }
    }

    /// Runs one sweep, then applies the eviction policy. Evicted sessions
    /// are forgotten by the ticker as well.
    pub fn tick(&mut self, out: &mut dyn Broadcast) -> TickReport {
        let report = self.ticker.tick(&mut self.registry, &mut self.rng, out);
        for id in self.registry.evict(self.eviction.as_ref()) {
            self.ticker.forget(&id);
        }
        report
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SessionRegistry {
        &mut self.registry
    }

    pub fn ticker(&self) -> &SessionTicker {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut SessionTicker {
        &mut self.ticker
    }

    pub fn config(&self) -> &GameConfig {
        self.controller.config()
    }
}

impl<R> std::fmt::Debug for GameService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("sessions", &self.registry.len())
            .field("ticking", &self.ticker.len())
            .finish_non_exhaustive()
    }
}
