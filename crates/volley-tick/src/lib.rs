//! Fixed-rate tick clock for Volley.
//!
//! The clock is the server's only source of passage-of-time. It does not
//! know about sessions: it fires, the owner advances every playing session
//! once, and reports back how long that took.
//!
//! # Integration
//!
//! The clock sits in the coordinator's `tokio::select!` loop next to the
//! command channel, so ticks and client commands never run concurrently:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* apply lifecycle action */ }
//!         _ = clock.wait_for_tick() => {
//!             service.tick(&mut connections);
//!             clock.record_tick_end();
//!         }
//!     }
//! }
//! ```
//!
//! A stopped clock pends forever in [`TickClock::wait_for_tick`], which
//! keeps the `select!` branch inert without cancelling anything.

mod config;

pub use config::{TickConfig, TickPolicy};

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

/// Returned by [`TickClock::wait_for_tick`] for each firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickInfo {
    /// Sequence number of this tick, starting at 1.
    pub tick: u64,
    /// `true` if the clock woke more than a tenth of a period late.
    pub late: bool,
    /// Whole periods that were skipped to catch up (`Skip` policy only).
    pub skipped: u64,
}

/// Running totals kept by the clock.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    pub ticks: u64,
    pub late_ticks: u64,
    pub skipped: u64,
    /// Longest work time reported through [`TickClock::record_tick_end`].
    pub max_work: Duration,
    /// Exponential moving average of the work time (α = 0.1).
    pub avg_work: Duration,
}

/// A cancellable fixed-period timer.
pub struct TickClock {
    config: TickConfig,
    period: Duration,
    running: bool,
    next: TokioInstant,
    count: u64,
    work_started: Option<Instant>,
    metrics: TickMetrics,
}

impl TickClock {
    /// Creates a clock. It is stopped until [`start`](Self::start) is called.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let period = config.period();
        debug!(
            rate_hz = config.tick_rate_hz,
            period_ms = period.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick clock created"
        );
        Self {
            config,
            period,
            running: false,
            next: TokioInstant::now() + period,
            count: 0,
            work_started: None,
            metrics: TickMetrics::default(),
        }
    }

    /// Starts (or restarts) the clock. The first tick fires one period from
    /// now, plus up to `initial_jitter_us` of random delay.
    ///
    /// Calling this on a running clock does nothing.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        let jitter = match self.config.initial_jitter_us {
            0 => Duration::ZERO,
            max => Duration::from_micros(rand::rng().random_range(0..max)),
        };
        self.next = TokioInstant::now() + self.period + jitter;
        self.running = true;
        debug!(tick = self.count, "tick clock started");
    }

    /// Stops the clock. Pending and future `wait_for_tick` calls pend until
    /// the clock is started again.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            debug!(tick = self.count, "tick clock stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Waits for the next tick.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if !self.running {
            std::future::pending::<()>().await;
        }

        let due = self.next;
        time::sleep_until(due).await;

        let now = TokioInstant::now();
        self.count += 1;
        self.work_started = Some(Instant::now());

        let behind = now.saturating_duration_since(due);
        let late = behind > self.period / 10;
        let periods_behind = (behind.as_nanos() / self.period.as_nanos()) as u64;

        let skipped = match self.config.policy {
            TickPolicy::Skip => {
                self.next = now + self.period;
                if periods_behind > 0 {
                    warn!(
                        tick = self.count,
                        skipped = periods_behind,
                        behind_ms = behind.as_secs_f64() * 1000.0,
                        "tick clock fell behind, skipping ahead"
                    );
                }
                periods_behind
            }
            TickPolicy::Burst => {
                // Keep the original cadence; overdue ticks fire back-to-back.
                self.next = due + self.period;
                if late {
                    trace!(tick = self.count, behind = periods_behind, "late tick, bursting");
                }
                0
            }
        };

        self.metrics.ticks += 1;
        self.metrics.skipped += skipped;
        if late {
            self.metrics.late_ticks += 1;
        }

        trace!(tick = self.count, late, "tick");
        TickInfo { tick: self.count, late, skipped }
    }

    /// Marks the end of the work done for the current tick.
    ///
    /// Emits a warning when the work used more than the configured share
    /// of the period. Does nothing if no tick is in progress.
    pub fn record_tick_end(&mut self) {
        let Some(started) = self.work_started.take() else {
            return;
        };
        let work = started.elapsed();
        let share = work.as_secs_f64() / self.period.as_secs_f64();

        if share >= self.config.budget_critical_threshold {
            warn!(
                tick = self.count,
                work_ms = work.as_secs_f64() * 1000.0,
                share_pct = format!("{:.1}", share * 100.0),
                "tick work exceeded its period"
            );
        } else if share >= self.config.budget_warn_threshold {
            warn!(
                tick = self.count,
                work_ms = work.as_secs_f64() * 1000.0,
                share_pct = format!("{:.1}", share * 100.0),
                "tick work nearing its period"
            );
        }

        self.metrics.max_work = self.metrics.max_work.max(work);
        let avg = self.metrics.avg_work.as_secs_f64() * 0.9 + work.as_secs_f64() * 0.1;
        self.metrics.avg_work = Duration::from_secs_f64(avg);
    }

    /// Number of ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.count
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }
}
