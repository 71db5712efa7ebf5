//! Error types for the record store.

use super::types::RecordId;
use thiserror::Error;

/// Errors returned by a record store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store could not be reached or rejected the statement
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Record disappeared between selection and update
    #[error("record {0} not found")]
    NotFound(RecordId),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
