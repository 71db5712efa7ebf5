//! Once command implementation

use crate::cli::output::{format_summary_json, format_summary_table};
use crate::cli::serve::{build_pricing_client, connect_store, init_tracing, load_config_with_overrides};
use crate::cli::OnceArgs;
use crate::pricing::CostSource;
use crate::reconciler::CostReconciler;
use std::sync::Arc;

/// Run one tick and render its summary.
pub async fn handle_once(
    reconciler: &CostReconciler,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let summary = reconciler.tick().await?;

    if json {
        Ok(format_summary_json(&summary)?)
    } else {
        Ok(format_summary_table(&summary))
    }
}

/// Handle `cost-reconciler once`
pub async fn run_once(args: OnceArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.common)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let source = Arc::new(build_pricing_client(&config.pricing));
    if !source.is_configured() {
        return Err(format!(
            "No pricing credential found. Set {} or {}.",
            config.pricing.api_key_env, config.pricing.fallback_api_key_env
        )
        .into());
    }

    let store = Arc::new(connect_store(&config).await?);
    let reconciler = CostReconciler::new(store.clone(), source, config.worker.clone());

    let output = handle_once(&reconciler, args.json).await;
    store.close().await;
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{CostResult, PricingError, TokenUsage};
    use crate::reconciler::WorkerConfig;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    struct FlatRate;

    #[async_trait]
    impl CostSource for FlatRate {
        fn is_configured(&self) -> bool {
            true
        }

        async fn fetch_cost(&self, generation_id: &str) -> Result<CostResult, PricingError> {
            Ok(CostResult {
                generation_id: generation_id.to_string(),
                model: "openai/gpt-4o-mini".to_string(),
                total_cost: 0.001,
                tokens: TokenUsage {
                    prompt: 10,
                    completion: 5,
                    ..Default::default()
                },
                cache_discount: None,
                latency: 42.0,
                created_at: "2024-06-01T12:00:00Z".to_string(),
            })
        }
    }

    fn reconciler_with(store: Arc<MemoryStore>) -> CostReconciler {
        let config = WorkerConfig {
            request_delay_ms: 0,
            ..Default::default()
        };
        CostReconciler::new(store, Arc::new(FlatRate), config)
    }

    #[tokio::test]
    async fn test_once_json_reports_updates() {
        let store = Arc::new(MemoryStore::default());
        let id = store.insert_event(Some("gen-1,gen-2"), chrono::Utc::now());

        let output = handle_once(&reconciler_with(store.clone()), true)
            .await
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["summary"]["fetched"], 1);
        assert_eq!(parsed["summary"]["updated"], 1);
        assert_eq!(store.get(id).unwrap().cost, Some(0.002));
    }

    #[tokio::test]
    async fn test_once_table_output() {
        let store = Arc::new(MemoryStore::default());
        let output = handle_once(&reconciler_with(store), false).await.unwrap();
        assert!(output.contains("Fetched"));
    }

    #[tokio::test]
    async fn test_once_store_failure_is_error() {
        let store = Arc::new(MemoryStore::default());
        store.set_available(false);

        let result = handle_once(&reconciler_with(store), true).await;
        assert!(result.is_err());
    }
}
