//! Server configuration.

use std::time::Duration;

use volley_game::{GameConfig, GameRules, DEFAULT_VELOCITY_MULTIPLIER};
use volley_tick::TickConfig;
use volley_transport::DEFAULT_PATH;

/// Everything a [`VolleyServer`](crate::VolleyServer) needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind_addr: String,
    /// The only HTTP path that is upgraded to a WebSocket.
    pub path: String,
    pub tick: TickConfig,
    /// Rules stamped onto every new session.
    pub rules: GameRules,
    /// Ball speed-up factor applied on every paddle hit.
    pub velocity_multiplier: f64,
    /// Capacity of the coordinator's command channel.
    pub command_buffer: usize,
    /// Drop a connection after this long without an inbound frame.
    /// `None` keeps idle connections open.
    pub idle_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            path: DEFAULT_PATH.to_string(),
            tick: TickConfig::default(),
            rules: GameRules::default(),
            velocity_multiplier: DEFAULT_VELOCITY_MULTIPLIER,
            command_buffer: 1024,
            idle_timeout: None,
        }
    }
}

impl ServerConfig {
    /// The per-session settings handed to the game core.
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            rules: self.rules,
            velocity_multiplier: self.velocity_multiplier,
        }
    }
}
