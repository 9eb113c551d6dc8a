//! # volley-game
//!
//! Session lifecycle and the authoritative simulation for Volley, a
//! two-player ball-and-paddle game.
//!
//! The crate is transport-agnostic. Clients are known only by
//! [`ClientId`](volley_protocol::ClientId), and everything the core wants
//! to tell them goes out through the [`Broadcast`] trait as a [`Notice`].
//!
//! ## Pieces
//!
//! - [`SessionRegistry`] owns every [`Session`].
//! - [`LifecycleController`] applies `create`, `join`, `start` and `update`.
//! - [`engine::advance`] moves one session forward by one tick.
//! - [`SessionTicker`] sweeps all playing sessions once per tick.
//! - [`GameService`] bundles the above for a single owning task.
//!
//! ## Example
//!
//! ```
//! use volley_game::{GameConfig, GameService, Notice};
//! use volley_protocol::{ClientId, ClientRequest};
//!
//! let mut service = GameService::new(GameConfig::default());
//! let mut outbox: Vec<(ClientId, Notice)> = Vec::new();
//!
//! let alice = ClientId::from("alice");
//! service.handle(&alice, ClientRequest::Create, &mut outbox).unwrap();
//! assert!(matches!(outbox[0].1, Notice::Created(_)));
//! ```

mod config;
pub mod engine;
mod error;
mod gateway;
mod lifecycle;
mod model;
mod registry;
mod service;
mod ticker;

pub use config::{
    DEFAULT_VELOCITY_MULTIPLIER, FIELD_MAX, FIELD_MIN, GameConfig, GameRules, GameStatus, PADDLE_INSET,
};
pub use engine::StepOutcome;
pub use error::GameError;
pub use gateway::{Broadcast, Notice};
pub use lifecycle::LifecycleController;
pub use model::{BallState, MAX_PLAYERS, PlayerState, Session, Side, Vector2D};
pub use registry::{EvictEnded, EvictionPolicy, RetainAll, SessionRegistry};
pub use service::GameService;
pub use ticker::{SessionTicker, TickReport};
