//! # Volley
//!
//! A server-authoritative, two-player ball-and-paddle game server.
//!
//! Clients connect over WebSocket, create or join a session, and stream
//! their paddle position. The server owns the ball, the collisions and
//! the score, and broadcasts the full session state to both players on
//! every tick.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use volley::prelude::*;
//!
//! # async fn demo() -> Result<(), VolleyError> {
//! let server = VolleyServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .rules(GameRules { max_score: 11, ..GameRules::default() })
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod connections;
mod coordinator;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::VolleyError;
pub use server::{VolleyServer, VolleyServerBuilder};

/// Re-exports for the common server setup.
pub mod prelude {
    pub use crate::{ServerConfig, VolleyError, VolleyServer, VolleyServerBuilder};
    pub use volley_game::{GameConfig, GameRules};
    pub use volley_tick::{TickConfig, TickPolicy};
}
