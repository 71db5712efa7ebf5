//! Error types for pricing lookups.

use thiserror::Error;

/// Errors returned by a single pricing lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// No credential was found at startup
    #[error("pricing client not configured: no API key available")]
    NotConfigured,

    /// Provider answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Call exceeded the per-request deadline
    #[error("request timeout after {0}ms")]
    Timeout(u64),

    /// Body did not match the generation schema
    #[error("invalid response schema: {0}")]
    InvalidSchema(String),

    /// Transport failure without a status (refused, DNS, reset)
    #[error("network error: {0}")]
    Network(String),
}

impl PricingError {
    /// Whether this error disables the whole subsystem rather than one call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, PricingError::NotConfigured)
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::NotConfigured => "not_configured",
            PricingError::HttpError(_) => "http_error",
            PricingError::Timeout(_) => "timeout",
            PricingError::InvalidSchema(_) => "invalid_schema",
            PricingError::Network(_) => "network",
        }
    }
}
