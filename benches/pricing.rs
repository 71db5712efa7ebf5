//! Benchmarks for response validation and per-record aggregation

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reconciler::pricing::schema::parse_generation;
use reconciler::pricing::{CostResult, CostSource, PricingError, TokenUsage};
use reconciler::reconciler::Aggregator;
use std::sync::Arc;
use std::time::Duration;

const VALID_BODY: &str = r#"{
  "data": {
    "id": "gen-1729000000-abcdef",
    "model": "anthropic/claude-3.5-sonnet",
    "total_cost": 0.0123,
    "native_tokens_prompt": 1200,
    "native_tokens_completion": 340,
    "native_tokens_cached": 800,
    "native_tokens_reasoning": 0,
    "cache_discount": 0.0021,
    "latency": 812,
    "created_at": "2024-11-02T10:15:00.000Z",
    "provider_name": "Anthropic",
    "streamed": true
  }
}"#;

const INVALID_BODY: &str = r#"{"data": {"id": "gen-1", "model": "m", "total_cost": "0.01"}}"#;

fn bench_parse_generation(c: &mut Criterion) {
    c.bench_function("parse_generation_valid", |b| {
        b.iter(|| black_box(parse_generation(black_box(VALID_BODY))));
    });

    c.bench_function("parse_generation_rejected", |b| {
        b.iter(|| black_box(parse_generation(black_box(INVALID_BODY))));
    });
}

/// Answers every lookup instantly; odd-numbered ids fail.
struct InstantSource;

#[async_trait]
impl CostSource for InstantSource {
    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_cost(&self, generation_id: &str) -> Result<CostResult, PricingError> {
        if generation_id.ends_with(['1', '3', '5', '7', '9']) {
            return Err(PricingError::HttpError(404));
        }
        Ok(CostResult {
            generation_id: generation_id.to_string(),
            model: "anthropic/claude-3.5-sonnet".to_string(),
            total_cost: 0.001,
            tokens: TokenUsage {
                prompt: 100,
                completion: 20,
                cached: 10,
                reasoning: 0,
            },
            cache_discount: None,
            latency: 10.0,
            created_at: "2024-11-02T10:15:00.000Z".to_string(),
        })
    }
}

fn bench_aggregate(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let aggregator = Aggregator::new(Arc::new(InstantSource), Duration::ZERO);
    let ids: Vec<String> = (0..20).map(|i| format!("gen-{}", i)).collect();

    c.bench_function("aggregate_20_generations", |b| {
        b.iter(|| black_box(runtime.block_on(aggregator.aggregate(black_box(&ids)))));
    });
}

criterion_group!(benches, bench_parse_generation, bench_aggregate);
criterion_main!(benches);
