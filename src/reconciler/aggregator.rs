//! Folds the lookups of one record into a single cost.

use crate::pricing::{AggregatedCost, CostSource};
use std::sync::Arc;
use std::time::Duration;

/// Resolves every generation id of a record, one after another.
///
/// Lookups are sequential with a fixed pause between them to stay under the
/// provider's rate limit. A record succeeds as soon as one id resolves; ids
/// that fail are left out of the totals.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn CostSource>,
    request_delay: Duration,
}

impl Aggregator {
    pub fn new(source: Arc<dyn CostSource>, request_delay: Duration) -> Self {
        Self {
            source,
            request_delay,
        }
    }

    /// Sum all successful lookups, or `None` if nothing resolved.
    pub async fn aggregate(&self, external_ids: &[String]) -> Option<AggregatedCost> {
        let mut total = AggregatedCost::default();

        for (index, generation_id) in external_ids.iter().enumerate() {
            if index > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            match self.source.fetch_cost(generation_id).await {
                Ok(cost) => total.add(&cost),
                Err(e) => {
                    total.failed += 1;
                    tracing::warn!(
                        generation_id = %generation_id,
                        error = %e,
                        "Cost lookup failed, leaving generation out of the total"
                    );
                }
            }
        }

        (total.resolved > 0).then_some(total)
    }
}
