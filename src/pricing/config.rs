//! Configuration for the pricing provider client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for generation-cost lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Provider API base URL; `/generation` is appended
    pub base_url: String,
    /// Hard deadline for one lookup, including the body read
    pub timeout_seconds: u64,
    /// Environment variable holding the provider key (checked first)
    pub api_key_env: String,
    /// Environment variable used when the primary one is unset
    pub fallback_api_key_env: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            timeout_seconds: 10,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            fallback_api_key_env: "ANTHROPIC_AUTH_TOKEN".to_string(),
        }
    }
}

impl PricingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
