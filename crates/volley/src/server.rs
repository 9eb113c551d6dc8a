//! `VolleyServer` builder and accept loop.
//!
//! This is the entry point for running a Volley game server. It ties the
//! layers together: transport → protocol → coordinator → game core.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::task::JoinHandle;
use volley_game::{GameRules, SessionRegistry};
use volley_tick::TickConfig;
use volley_transport::{Transport, WebSocketTransport};

use crate::coordinator::{spawn_coordinator, CoordinatorHandle};
use crate::handler::handle_connection;
use crate::{ServerConfig, VolleyError};

/// Builder for configuring and starting a Volley server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), volley::VolleyError> {
/// use volley::VolleyServer;
///
/// let server = VolleyServer::builder()
///     .bind("0.0.0.0:8080")
///     .tick_rate(60)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct VolleyServerBuilder {
    config: ServerConfig,
}

impl VolleyServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the HTTP path that is upgraded to a WebSocket.
    pub fn path(mut self, path: &str) -> Self {
        self.config.path = path.to_string();
        self
    }

    pub fn tick_config(mut self, tick: TickConfig) -> Self {
        self.config.tick = tick;
        self
    }

    /// Sets the tick rate in Hz, keeping the other clock settings.
    pub fn tick_rate(mut self, hz: u32) -> Self {
        self.config.tick.tick_rate_hz = hz;
        self
    }

    pub fn rules(mut self, rules: GameRules) -> Self {
        self.config.rules = rules;
        self
    }

    pub fn velocity_multiplier(mut self, multiplier: f64) -> Self {
        self.config.velocity_multiplier = multiplier;
        self
    }

    pub fn command_buffer(mut self, capacity: usize) -> Self {
        self.config.command_buffer = capacity;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Validates the rules, binds the listener and starts the coordinator.
    ///
    /// # Errors
    /// [`VolleyError::Game`] for unplayable rules, [`VolleyError::Transport`]
    /// if the address cannot be bound.
    pub async fn build(mut self) -> Result<VolleyServer, VolleyError> {
        self.config.rules = self.config.rules.validated()?;
        let transport = WebSocketTransport::bind(&self.config.bind_addr, &self.config.path).await?;
        let (coordinator, coordinator_task) = spawn_coordinator(&self.config);
        Ok(VolleyServer {
            transport,
            config: self.config,
            coordinator,
            coordinator_task,
        })
    }
}

/// A bound Volley server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct VolleyServer {
    transport: WebSocketTransport,
    config: ServerConfig,
    coordinator: CoordinatorHandle,
    coordinator_task: JoinHandle<SessionRegistry>,
}

impl VolleyServer {
    /// Creates a new builder.
    pub fn builder() -> VolleyServerBuilder {
        VolleyServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, VolleyError> {
        Ok(self.transport.local_addr()?)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), VolleyError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves, then stops the
    /// coordinator and waits for it.
    ///
    /// Connections already open are not closed; they stop receiving
    /// notices once the coordinator has gone.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> Result<(), VolleyError> {
        let addr = self.local_addr()?;
        tracing::info!(%addr, path = %self.config.path, "Volley server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let coordinator = self.coordinator.clone();
                        let idle_timeout = self.config.idle_timeout;
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, coordinator, idle_timeout).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "accept failed"),
                },
            }
        }

        tracing::info!("shutting down");
        let _ = self.coordinator.shutdown().await;
        match self.coordinator_task.await {
            Ok(registry) => tracing::info!(sessions = registry.len(), "server stopped"),
            Err(e) => tracing::error!(error = %e, "coordinator task failed"),
        }
        Ok(())
    }
}
