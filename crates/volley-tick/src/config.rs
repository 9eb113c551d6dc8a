//! Clock configuration.

use std::time::Duration;

use tracing::warn;

/// What the clock does after waking up late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Drop the missed periods and schedule the next tick from now.
    #[default]
    Skip,
    /// Keep the original schedule, firing overdue ticks immediately one
    /// after another until the clock has caught up.
    Burst,
}

/// Settings for a [`TickClock`](crate::TickClock).
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Ticks per second. Clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    pub policy: TickPolicy,
    /// Share of the period (0.0–1.0) above which tick work logs a warning.
    pub budget_warn_threshold: f64,
    /// Share of the period (0.0–1.0) above which tick work logs as critical.
    pub budget_critical_threshold: f64,
    /// Upper bound on random delay added before the first tick, in µs.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
            budget_critical_threshold: 1.0,
            initial_jitter_us: 0,
        }
    }
}

impl TickConfig {
    /// 30 Hz, one tick every ~33 ms.
    pub const DEFAULT_TICK_RATE_HZ: u32 = 30;
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Default settings at the given rate.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self { tick_rate_hz, ..Default::default() }
    }

    /// Clamps every field into its legal range.
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            let clamped = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
            warn!(rate = self.tick_rate_hz, clamped, "tick rate out of range");
            self.tick_rate_hz = clamped;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self.budget_critical_threshold = self.budget_critical_threshold.clamp(0.0, 1.0);
        self.budget_warn_threshold = self.budget_warn_threshold.min(self.budget_critical_threshold);
        self
    }

    /// Length of one tick. Assumes a validated config.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_thirty_hz() {
        let cfg = TickConfig::default();
        assert_eq!(cfg.tick_rate_hz, 30);
        assert_eq!(cfg.policy, TickPolicy::Skip);
        let ms = cfg.period().as_secs_f64() * 1000.0;
        assert!((ms - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_validated_clamps_rate() {
        assert_eq!(TickConfig::with_rate(0).validated().tick_rate_hz, 1);
        assert_eq!(TickConfig::with_rate(1000).validated().tick_rate_hz, 128);
        assert_eq!(TickConfig::with_rate(60).validated().tick_rate_hz, 60);
    }

    #[test]
    fn test_validated_orders_thresholds() {
        let cfg = TickConfig {
            budget_warn_threshold: 1.5,
            budget_critical_threshold: 0.5,
            ..TickConfig::default()
        }
        .validated();
        assert_eq!(cfg.budget_critical_threshold, 0.5);
        assert_eq!(cfg.budget_warn_threshold, 0.5);
    }
}
