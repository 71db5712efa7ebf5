//! Configuration module for the cost reconciler
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`RECONCILER_*`, plus `DATABASE_URL`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use reconciler::config::ReconcilerConfig;
//!
//! // Load defaults
//! let config = ReconcilerConfig::default();
//! assert_eq!(config.worker.batch_size, 50);
//!
//! // Parse from TOML
//! let toml = r#"
//! [worker]
//! batch_size = 10
//! "#;
//! let config: ReconcilerConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.worker.batch_size, 10);
//! ```

pub mod error;
pub mod logging;
pub mod metrics;
pub mod store;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use metrics::MetricsConfig;
pub use store::StoreConfig;

// Section types owned by the components they configure
pub use crate::pricing::PricingConfig;
pub use crate::reconciler::WorkerConfig;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Unified configuration for the reconciler process.
///
/// # Example
///
/// ```rust
/// use reconciler::config::ReconcilerConfig;
///
/// let config = ReconcilerConfig::default();
/// assert_eq!(config.pricing.timeout_seconds, 10);
/// assert_eq!(config.worker.poll_interval_seconds, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Pricing provider client
    pub pricing: PricingConfig,
    /// Background reconciliation loop
    pub worker: WorkerConfig,
    /// Record store connection
    pub store: StoreConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Prometheus exporter
    pub metrics: MetricsConfig,
}

impl ReconcilerConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (the current value is kept).
    pub fn with_env_overrides(mut self) -> Self {
        // Pricing
        if let Ok(url) = std::env::var("RECONCILER_PRICING_URL") {
            self.pricing.base_url = url;
        }
        if let Ok(timeout) = std::env::var("RECONCILER_PRICING_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.pricing.timeout_seconds = t;
            }
        }

        // Worker
        if let Ok(worker) = std::env::var("RECONCILER_WORKER") {
            self.worker.enabled = worker.to_lowercase() == "true";
        }
        if let Ok(batch) = std::env::var("RECONCILER_BATCH_SIZE") {
            if let Ok(b) = batch.parse() {
                self.worker.batch_size = b;
            }
        }
        if let Ok(interval) = std::env::var("RECONCILER_POLL_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.worker.poll_interval_seconds = i;
            }
        }

        // Store
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                self.store.database_url = Some(url);
            }
        }

        // Logging
        if let Ok(level) = std::env::var("RECONCILER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("RECONCILER_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        // Metrics
        if let Ok(metrics) = std::env::var("RECONCILER_METRICS") {
            self.metrics.enabled = metrics.to_lowercase() == "true";
        }
        if let Ok(addr) = std::env::var("RECONCILER_METRICS_ADDR") {
            self.metrics.listen_addr = addr;
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let worker = &self.worker;

        if self.pricing.base_url.trim().is_empty() {
            return Err(invalid("pricing.base_url", "URL cannot be empty"));
        }
        if self.pricing.timeout_seconds == 0 {
            return Err(invalid("pricing.timeout_seconds", "timeout must be non-zero"));
        }
        if worker.batch_size == 0 {
            return Err(invalid("worker.batch_size", "batch size must be non-zero"));
        }
        if worker.max_retries == 0 {
            return Err(invalid("worker.max_retries", "retry cap must be non-zero"));
        }
        if worker.poll_interval_seconds == 0 {
            return Err(invalid(
                "worker.poll_interval_seconds",
                "poll interval must be non-zero",
            ));
        }
        if worker.max_poll_interval_seconds < worker.poll_interval_seconds {
            return Err(invalid(
                "worker.max_poll_interval_seconds",
                "ceiling cannot be below the base poll interval",
            ));
        }
        if worker.error_threshold == 0 {
            return Err(invalid(
                "worker.error_threshold",
                "error threshold must be non-zero",
            ));
        }
        if self.store.table_name.is_empty()
            || !self
                .store
                .table_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid(
                "store.table_name",
                "table name must be non-empty and contain only [A-Za-z0-9_]",
            ));
        }
        self.logging.validate()?;
        if self.metrics.enabled && self.metrics.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(invalid(
                "metrics.listen_addr",
                &format!("'{}' is not a socket address", self.metrics.listen_addr),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
