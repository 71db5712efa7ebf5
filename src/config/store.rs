//! Record store configuration

use serde::{Deserialize, Serialize};

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// PostgreSQL connection URL; `DATABASE_URL` takes precedence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    pub table_name: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            table_name: "telemetry_events".to_string(),
            max_connections: 20,
            connect_timeout_seconds: 10,
        }
    }
}
