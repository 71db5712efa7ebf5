//! Pending record types and the selection policy.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Row identifier of a stored telemetry event.
pub type RecordId = i64;

/// Separator between generation ids of a multi-turn session.
pub const EXTERNAL_ID_SEPARATOR: char = ',';

/// A stored event still waiting for its cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRecord {
    pub id: RecordId,
    /// Generation ids, in stored order
    pub external_ids: Vec<String>,
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
}

impl PendingRecord {
    /// Build a record from its stored, comma-delimited id string.
    pub fn from_stored(
        id: RecordId,
        generation_ids: &str,
        retry_count: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            external_ids: parse_external_ids(generation_ids),
            retry_count,
            created_at,
        }
    }
}

/// Split a stored id string into trimmed, non-empty segments.
pub fn parse_external_ids(raw: &str) -> Vec<String> {
    raw.split(EXTERNAL_ID_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rule deciding which stored events are eligible for reconciliation.
///
/// An event is pending iff it has no cost, has been retried fewer than
/// `max_retries` times and was created inside the freshness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPolicy {
    pub max_retries: u32,
    pub freshness_window: chrono::Duration,
}

impl Default for PendingPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            freshness_window: chrono::Duration::hours(24),
        }
    }
}

impl PendingPolicy {
    /// Oldest creation time still eligible at `now` (exclusive).
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.freshness_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_pending(
        &self,
        has_cost: bool,
        retry_count: u32,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        !has_cost && retry_count < self.max_retries && created_at > self.cutoff(now)
    }
}
