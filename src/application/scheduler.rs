// Refresh scheduler - one cancellable repeating timer keyed by its configuration
use crate::domain::connection::ConnectionConfig;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// What the timer drives on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Incremental refresh against the remote source.
    Remote,
    /// Random-walk simulator.
    Simulated,
}

/// Everything that, when changed, must tear down and recreate the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerKey {
    pub mode: RefreshMode,
    pub period: Duration,
    pub config: ConnectionConfig,
}

impl TimerKey {
    pub fn for_config(config: &ConnectionConfig) -> Self {
        let mode = if config.is_fully_specified() {
            RefreshMode::Remote
        } else {
            RefreshMode::Simulated
        };
        Self {
            mode,
            period: config.refresh_interval(),
            config: config.clone(),
        }
    }
}

pub struct RefreshScheduler {
    key: TimerKey,
    interval: Interval,
}

impl RefreshScheduler {
    pub fn new(key: TimerKey) -> Self {
        let interval = build_interval(key.period);
        Self { key, interval }
    }

    pub fn key(&self) -> &TimerKey {
        &self.key
    }

    pub fn mode(&self) -> RefreshMode {
        self.key.mode
    }

    /// Restart the timer if `key` differs from the current one.
    ///
    /// Returns whether a restart happened. The first tick after a restart
    /// fires one full period later.
    pub fn reconfigure(&mut self, key: TimerKey) -> bool {
        if key == self.key {
            return false;
        }

        tracing::debug!(
            "Restarting refresh timer: {:?} every {:?} -> {:?} every {:?}",
            self.key.mode,
            self.key.period,
            key.mode,
            key.period
        );
        self.interval = build_interval(key.period);
        self.key = key;
        true
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}

fn build_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
