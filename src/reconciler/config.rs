//! Configuration for the reconciliation worker.

use crate::store::PendingPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the background reconciliation loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Whether the worker is started by `serve`
    pub enabled: bool,
    /// Maximum records pulled per tick
    pub batch_size: usize,
    /// Fully failed attempts before a record is abandoned
    pub max_retries: u32,
    /// Records older than this are never selected
    pub freshness_window_hours: u64,
    /// Base delay between ticks
    pub poll_interval_seconds: u64,
    /// Ceiling for the backed-off delay
    pub max_poll_interval_seconds: u64,
    /// Consecutive failed ticks before the delay starts doubling
    pub error_threshold: u32,
    /// Pause between successive lookups for the same record
    pub request_delay_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: 50,
            max_retries: 3,
            freshness_window_hours: 24,
            poll_interval_seconds: 10,
            max_poll_interval_seconds: 60,
            error_threshold: 5,
            request_delay_ms: 100,
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn max_poll_interval(&self) -> Duration {
        Duration::from_secs(self.max_poll_interval_seconds)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Selection rule handed to record stores.
    pub fn pending_policy(&self) -> PendingPolicy {
        PendingPolicy {
            max_retries: self.max_retries,
            freshness_window: i64::try_from(self.freshness_window_hours)
                .ok()
                .and_then(chrono::Duration::try_hours)
                .unwrap_or(chrono::Duration::MAX),
        }
    }
}
