//! Record store gateway.
//!
//! The reconciler reads pending events and writes costs back through the
//! `RecordStore` trait. The store is the only shared mutable resource; each
//! operation touches a single record and relies on the store's own per-row
//! atomicity.

mod error;
mod memory;
mod postgres;
mod types;

pub use error::*;
pub use memory::{MemoryStore, StoredEvent};
pub use postgres::PostgresStore;
pub use types::*;

use crate::pricing::AggregatedCost;
use async_trait::async_trait;

/// Storage operations the reconciler depends on.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Backend name for logging (e.g. "postgres", "memory").
    fn name(&self) -> &str;

    /// Pending records, oldest `created_at` first, at most `limit`.
    async fn fetch_pending(&self, limit: usize) -> Result<Vec<PendingRecord>, StoreError>;

    /// Set cost and token totals. The record becomes terminal; a repeated
    /// write overwrites the previous one.
    async fn apply_cost(&self, id: RecordId, cost: &AggregatedCost) -> Result<(), StoreError>;

    /// Raise the retry counter by one and return the new value.
    async fn increment_retry(&self, id: RecordId) -> Result<u32, StoreError>;
}
