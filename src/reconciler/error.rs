//! Error types for reconciliation ticks.

use crate::store::StoreError;
use thiserror::Error;

/// Failure of a tick as a whole. Per-record failures never surface here.
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    #[error("record store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The tick task panicked or was cancelled before it finished
    #[error("reconciliation tick aborted: {0}")]
    Aborted(String),
}
