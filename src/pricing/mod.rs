//! Pricing provider client.
//!
//! Resolves the billed cost of a single generation id through the provider's
//! generation endpoint. Each lookup is one bounded HTTP call; failures are
//! classified and returned, never retried here.

mod config;
mod credential;
mod error;
pub mod schema;
mod types;

pub use config::*;
pub use credential::*;
pub use error::*;
pub use types::*;

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Anything that can turn a generation id into a cost.
///
/// `PricingClient` is the production implementation; the aggregator only
/// depends on this trait.
#[async_trait]
pub trait CostSource: Send + Sync + 'static {
    /// Whether lookups can be attempted at all.
    fn is_configured(&self) -> bool;

    /// Resolve one generation id.
    async fn fetch_cost(&self, generation_id: &str) -> Result<CostResult, PricingError>;
}

/// HTTP client for the provider's `GET /generation?id=...` endpoint.
pub struct PricingClient {
    /// HTTP client with connection pooling
    client: reqwest::Client,
    /// Base URL without trailing slash
    base_url: String,
    /// Bearer credential, resolved once at construction
    credential: Option<Credential>,
    /// Hard per-call deadline
    timeout: Duration,
}

impl PricingClient {
    /// Create a client, resolving the credential from the environment.
    pub fn new(config: &PricingConfig) -> Self {
        Self::with_credential(config, Credential::resolve(config))
    }

    /// Create a client with an explicit credential (or none).
    pub fn with_credential(config: &PricingConfig, credential: Option<Credential>) -> Self {
        Self::with_client(config, credential, reqwest::Client::new())
    }

    /// Create a client with a custom HTTP client (for testing).
    pub fn with_client(
        config: &PricingConfig,
        credential: Option<Credential>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential,
            timeout: config.timeout(),
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Fetch and validate the cost record for one generation id.
    pub async fn fetch_generation(&self, generation_id: &str) -> Result<CostResult, PricingError> {
        let Some(credential) = &self.credential else {
            return Err(PricingError::NotConfigured);
        };

        let start = Instant::now();
        let timeout_ms = self.timeout.as_millis() as u64;
        let url = format!("{}/generation", self.base_url);

        // Dropping the future on expiry aborts the in-flight request
        let request = async {
            let response = self
                .client
                .get(&url)
                .query(&[("id", generation_id)])
                .bearer_auth(credential.key())
                .send()
                .await
                .map_err(|e| Self::classify_error(e, timeout_ms))?;

            if !response.status().is_success() {
                return Err(PricingError::HttpError(response.status().as_u16()));
            }

            let body = response
                .text()
                .await
                .map_err(|e| Self::classify_error(e, timeout_ms))?;

            schema::parse_generation(&body)
        };

        let result = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(PricingError::Timeout(timeout_ms)),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::counter!("reconciler_pricing_requests_total", "outcome" => outcome).increment(1);
        metrics::histogram!("reconciler_pricing_latency_seconds")
            .record(start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            tracing::debug!(
                generation_id = generation_id,
                error = %e,
                "Pricing lookup failed"
            );
        }

        result
    }

    /// Classify reqwest error into PricingError.
    fn classify_error(e: reqwest::Error, timeout_ms: u64) -> PricingError {
        if e.is_timeout() {
            PricingError::Timeout(timeout_ms)
        } else if let Some(status) = e.status() {
            PricingError::HttpError(status.as_u16())
        } else {
            PricingError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl CostSource for PricingClient {
    fn is_configured(&self) -> bool {
        self.credential.is_some()
    }

    async fn fetch_cost(&self, generation_id: &str) -> Result<CostResult, PricingError> {
        self.fetch_generation(generation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_returns_not_configured() {
        // Port 9 (discard) would fail with Network if a request were attempted
        let config = PricingConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = PricingClient::with_credential(&config, None);

        assert!(!client.is_configured());
        assert_eq!(
            client.fetch_cost("gen_1").await,
            Err(PricingError::NotConfigured)
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = PricingConfig {
            base_url: "http://localhost:1234/api/v1/".to_string(),
            ..Default::default()
        };
        let client = PricingClient::with_credential(&config, None);
        assert_eq!(client.base_url, "http://localhost:1234/api/v1");
    }

    #[test]
    fn test_with_timeout_overrides_config() {
        let client = PricingClient::with_credential(&PricingConfig::default(), None)
            .with_timeout(Duration::from_millis(250));
        assert_eq!(client.timeout, Duration::from_millis(250));
    }
}
