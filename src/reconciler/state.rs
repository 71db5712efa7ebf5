//! Worker-level backoff state.

use super::config::WorkerConfig;
use std::time::Duration;

/// Polling cadence and the consecutive tick-failure counter.
///
/// Owned by a single worker instance; two workers never share counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffState {
    cadence: Duration,
    consecutive_errors: u32,
}

impl BackoffState {
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            cadence: config.poll_interval(),
            consecutive_errors: 0,
        }
    }

    /// Delay before the next tick.
    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// A tick completed: reset the counter and the cadence.
    pub fn record_success(&mut self, config: &WorkerConfig) {
        self.consecutive_errors = 0;
        self.cadence = config.poll_interval();
    }

    /// A tick failed as a whole. Returns true if the cadence changed.
    ///
    /// Once the counter reaches the threshold every further failure doubles
    /// the cadence, up to the configured ceiling.
    pub fn record_failure(&mut self, config: &WorkerConfig) -> bool {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);

        if self.consecutive_errors < config.error_threshold {
            return false;
        }

        let next = self
            .cadence
            .saturating_mul(2)
            .min(config.max_poll_interval());
        let changed = next != self.cadence;
        self.cadence = next;
        changed
    }
}
