//! Cost and token usage types.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Token counts billed for one or more generations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt: u64,
    pub completion: u64,
    pub cached: u64,
    pub reasoning: u64,
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt = self.prompt.saturating_add(other.prompt);
        self.completion = self.completion.saturating_add(other.completion);
        self.cached = self.cached.saturating_add(other.cached);
        self.reasoning = self.reasoning.saturating_add(other.reasoning);
    }
}

/// Validated cost record for a single generation id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostResult {
    /// Provider-side generation identifier
    pub generation_id: String,
    /// Model that served the generation
    pub model: String,
    /// Total billed cost, currency-agnostic
    pub total_cost: f64,
    pub tokens: TokenUsage,
    /// Discount applied for cached prompt tokens, if the provider reports one
    pub cache_discount: Option<f64>,
    /// Provider-reported latency
    pub latency: f64,
    /// Provider creation timestamp, kept verbatim
    pub created_at: String,
}

/// Sum of every successful lookup for one pending record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedCost {
    pub total_cost: f64,
    pub tokens: TokenUsage,
    /// Identifiers that resolved
    pub resolved: u32,
    /// Identifiers that failed and were left out of the totals
    pub failed: u32,
}

impl AggregatedCost {
    /// Fold one successful lookup into the totals.
    pub fn add(&mut self, cost: &CostResult) {
        self.total_cost += cost.total_cost;
        self.tokens += cost.tokens;
        self.resolved += 1;
    }
}
