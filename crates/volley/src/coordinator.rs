//! The coordinator actor: sole owner of game state.
//!
//! Connection tasks never touch sessions. They send [`Command`]s through a
//! [`CoordinatorHandle`]; one Tokio task drains those commands and the
//! tick clock in a single loop, so lifecycle requests and tick sweeps
//! never overlap.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use volley_game::{GameService, SessionRegistry};
use volley_protocol::{ClientId, ClientRequest};
use volley_tick::TickClock;

use crate::connections::{ConnectionTable, Outbound};
use crate::{ServerConfig, VolleyError};

/// Messages accepted by the coordinator.
pub(crate) enum Command {
    /// A connection opened and wants to receive notices.
    Connect { client_id: ClientId, outbound: Outbound },
    /// A decoded client request.
    Request { client_id: ClientId, request: ClientRequest },
    /// A connection closed.
    Disconnect { client_id: ClientId },
    /// Stop the actor.
    Shutdown,
}

/// Cheap, cloneable sender side of the coordinator.
#[derive(Clone)]
pub(crate) struct CoordinatorHandle {
    sender: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    pub(crate) async fn connect(&self, client_id: ClientId, outbound: Outbound) -> Result<(), VolleyError> {
        self.send(Command::Connect { client_id, outbound }).await
    }

    pub(crate) async fn request(&self, client_id: ClientId, request: ClientRequest) -> Result<(), VolleyError> {
        self.send(Command::Request { client_id, request }).await
    }

    /// Queues a disconnect without waiting, for use from `Drop`.
    pub(crate) fn disconnect_now(&self, client_id: ClientId) {
        match self.sender.try_send(Command::Disconnect { client_id }) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(cmd)) => {
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let _ = sender.send(cmd).await;
                });
            }
        }
    }

    pub(crate) async fn shutdown(&self) -> Result<(), VolleyError> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, cmd: Command) -> Result<(), VolleyError> {
        self.sender.send(cmd).await.map_err(|_| VolleyError::Unavailable)
    }
}

struct Coordinator {
    service: GameService,
    connections: ConnectionTable,
    clock: TickClock,
    receiver: mpsc::Receiver<Command>,
}

impl Coordinator {
    async fn run(mut self) -> SessionRegistry {
        tracing::info!(tick_hz = self.clock.period().as_secs_f64().recip(), "coordinator started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },
                info = self.clock.wait_for_tick() => {
                    let report = self.service.tick(&mut self.connections);
                    self.clock.record_tick_end();
                    if info.skipped > 0 {
                        tracing::debug!(tick = info.tick, skipped = info.skipped, "tick clock fell behind");
                    }
                    if !report.ended.is_empty() {
                        tracing::debug!(tick = info.tick, ended = report.ended.len(), "sessions ended");
                    }
                    if self.service.ticker().is_empty() {
                        tracing::debug!("no playing sessions, pausing tick clock");
                        self.clock.stop();
                    }
                }
            }
        }

        tracing::info!(
            sessions = self.service.registry().len(),
            connections = self.connections.len(),
            ticks = self.clock.tick_count(),
            "coordinator stopped"
        );
        std::mem::take(self.service.registry_mut())
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { client_id, outbound } => {
                tracing::debug!(%client_id, "client registered");
                self.connections.insert(client_id, outbound);
            }
            Command::Request { client_id, request } => {
                let action = request.action();
                if let Err(e) = self.service.handle(&client_id, request, &mut self.connections) {
                    tracing::debug!(%client_id, %action, error = %e, "request refused");
                    self.connections.send_text(&client_id, e.to_string());
                }
                if !self.clock.is_running() && !self.service.ticker().is_empty() {
                    self.clock.start();
                }
            }
            Command::Disconnect { client_id } => {
                if self.connections.remove(&client_id) {
                    tracing::debug!(%client_id, "client unregistered");
                }
            }
            Command::Shutdown => {}
        }
    }
}

/// Spawns the coordinator task.
///
/// The task returns the session registry when it stops, which lets tests
/// inspect final state.
pub(crate) fn spawn_coordinator(config: &ServerConfig) -> (CoordinatorHandle, JoinHandle<SessionRegistry>) {
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
    let coordinator = Coordinator {
        service: GameService::new(config.game_config()),
        connections: ConnectionTable::new(),
        clock: TickClock::new(config.tick.clone()),
        receiver: rx,
    };
    let task = tokio::spawn(coordinator.run());
    (CoordinatorHandle { sender: tx }, task)
}
