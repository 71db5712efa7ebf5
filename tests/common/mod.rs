//! Shared test utilities for reconciler integration tests.
//!
//! Provides a mock pricing provider built on wiremock plus helpers for
//! clients, stores and worker configuration.

#![allow(dead_code)]

use reconciler::pricing::{Credential, CredentialSource, PricingClient, PricingConfig};
use reconciler::reconciler::WorkerConfig;
use reconciler::store::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Well-Known Test Constants
// =============================================================================

/// Bearer key the mock provider expects.
pub const TEST_API_KEY: &str = "sk-or-test-key";

/// Path of the generation endpoint below the base URL.
pub const GENERATION_PATH: &str = "/api/v1/generation";

// =============================================================================
// Response Builders
// =============================================================================

/// A well-formed generation response body.
pub fn generation_body(id: &str, total_cost: f64, prompt: u64, completion: u64) -> Value {
    json!({
        "data": {
            "id": id,
            "model": "anthropic/claude-3.5-sonnet",
            "total_cost": total_cost,
            "native_tokens_prompt": prompt,
            "native_tokens_completion": completion,
            "native_tokens_cached": 0,
            "native_tokens_reasoning": 0,
            "cache_discount": null,
            "latency": 812,
            "created_at": "2024-11-02T10:15:00.000Z",
            "provider_name": "Anthropic"
        }
    })
}

// =============================================================================
// Mock Provider
// =============================================================================

/// Start a mock provider with no routes mounted.
pub async fn start_provider() -> MockServer {
    MockServer::builder().start().await
}

/// Serve `body` for `GET /generation?id={id}` with the test bearer key.
pub async fn mount_generation(server: &MockServer, id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(GENERATION_PATH))
        .and(query_param("id", id))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve a bare status code for one generation id.
pub async fn mount_status(server: &MockServer, id: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(GENERATION_PATH))
        .and(query_param("id", id))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

// =============================================================================
// Client and Worker Builders
// =============================================================================

/// Pricing configuration pointing at the mock provider.
pub fn pricing_config(server: &MockServer) -> PricingConfig {
    PricingConfig {
        base_url: format!("{}/api/v1", server.uri()),
        timeout_seconds: 2,
        ..Default::default()
    }
}

pub fn test_credential() -> Credential {
    Credential::new(TEST_API_KEY, CredentialSource::Primary, "OPENROUTER_API_KEY")
}

/// Client with the test credential.
pub fn client_for(server: &MockServer) -> PricingClient {
    PricingClient::with_credential(&pricing_config(server), Some(test_credential()))
}

/// Client with a short deadline for timeout tests.
pub fn client_with_timeout(server: &MockServer, timeout: Duration) -> PricingClient {
    client_for(server).with_timeout(timeout)
}

/// Worker configuration without the inter-request pause.
pub fn fast_worker_config() -> WorkerConfig {
    WorkerConfig {
        request_delay_ms: 0,
        ..Default::default()
    }
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::default())
}
