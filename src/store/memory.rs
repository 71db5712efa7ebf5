//! In-process record store.

use super::{PendingPolicy, PendingRecord, RecordId, RecordStore, StoreError};
use crate::pricing::{AggregatedCost, TokenUsage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// One stored telemetry event, as far as reconciliation is concerned.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub id: RecordId,
    /// Raw comma-delimited generation ids, `None` for non-LLM events
    pub generation_id: Option<String>,
    pub cost: Option<f64>,
    pub tokens: TokenUsage,
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
}

/// `DashMap`-backed store with the same selection rules as the database.
///
/// Availability can be switched off to simulate an unreachable store.
pub struct MemoryStore {
    events: DashMap<RecordId, StoredEvent>,
    next_id: AtomicI64,
    policy: PendingPolicy,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(PendingPolicy::default())
    }
}

impl MemoryStore {
    pub fn new(policy: PendingPolicy) -> Self {
        Self {
            events: DashMap::new(),
            next_id: AtomicI64::new(1),
            policy,
            available: AtomicBool::new(true),
        }
    }

    /// Insert an uncosted event and return its id.
    pub fn insert_event(&self, generation_id: Option<&str>, created_at: DateTime<Utc>) -> RecordId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.events.insert(
            id,
            StoredEvent {
                id,
                generation_id: generation_id.map(str::to_string),
                cost: None,
                tokens: TokenUsage::default(),
                retry_count: 0,
                created_at,
            },
        );
        id
    }

    /// Insert an event with an explicit retry count.
    pub fn insert_with_retries(
        &self,
        generation_id: &str,
        retry_count: u32,
        created_at: DateTime<Utc>,
    ) -> RecordId {
        let id = self.insert_event(Some(generation_id), created_at);
        if let Some(mut event) = self.events.get_mut(&id) {
            event.retry_count = retry_count;
        }
        id
    }

    pub fn get(&self, id: RecordId) -> Option<StoredEvent> {
        self.events.get(&id).map(|e| e.clone())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Toggle simulated reachability; every operation fails while `false`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_pending(&self, limit: usize) -> Result<Vec<PendingRecord>, StoreError> {
        self.ensure_available()?;
        let now = Utc::now();

        let mut pending: Vec<PendingRecord> = self
            .events
            .iter()
            .filter(|e| {
                self.policy
                    .is_pending(e.cost.is_some(), e.retry_count, e.created_at, now)
            })
            .filter_map(|e| {
                e.generation_id.as_deref().map(|ids| {
                    PendingRecord::from_stored(e.id, ids, e.retry_count, e.created_at)
                })
            })
            .collect();

        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        pending.truncate(limit);
        Ok(pending)
    }

    async fn apply_cost(&self, id: RecordId, cost: &AggregatedCost) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut event = self.events.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        event.cost = Some(cost.total_cost);
        event.tokens = cost.tokens;
        Ok(())
    }

    async fn increment_retry(&self, id: RecordId) -> Result<u32, StoreError> {
        self.ensure_available()?;
        let mut event = self.events.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        event.retry_count += 1;
        Ok(event.retry_count)
    }
}
