//! Background cost reconciliation.
//!
//! The worker wakes up on a timer, pulls a batch of cost-pending records from
//! the store, resolves each through the pricing provider and writes the
//! result back. Ticks never overlap: the next one is scheduled only after the
//! current one has finished. Sustained store failures stretch the cadence;
//! the first clean tick restores it.

mod aggregator;
mod config;
mod error;
mod state;


pub use aggregator::Aggregator;
pub use config::*;
pub use error::*;
pub use state::*;

use crate::pricing::CostSource;
use crate::store::{RecordStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Outcome counters for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Records returned by the store
    pub fetched: usize,
    /// Records that received a cost
    pub updated: usize,
    /// Records where every lookup failed
    pub failed: usize,
    /// Records that reached the retry cap during this tick
    pub abandoned: usize,
    /// Retry increments the store rejected
    pub retry_errors: usize,
}

/// Reconciliation worker: one instance owns one backoff state.
#[derive(Clone)]
pub struct CostReconciler {
    store: Arc<dyn RecordStore>,
    source: Arc<dyn CostSource>,
    aggregator: Aggregator,
    config: WorkerConfig,
    backoff: BackoffState,
}

impl CostReconciler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        source: Arc<dyn CostSource>,
        config: WorkerConfig,
    ) -> Self {
        let aggregator = Aggregator::new(Arc::clone(&source), config.request_delay());
        let backoff = BackoffState::new(&config);
        Self {
            store,
            source,
            aggregator,
            config,
            backoff,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn backoff(&self) -> &BackoffState {
        &self.backoff
    }

    /// Process one batch without touching the backoff state.
    pub async fn tick(&self) -> Result<TickSummary, ReconcileError> {
        let records = self.store.fetch_pending(self.config.batch_size).await?;
        let mut summary = TickSummary {
            fetched: records.len(),
            ..Default::default()
        };

        for record in records {
            match self.aggregator.aggregate(&record.external_ids).await {
                Some(cost) => match self.store.apply_cost(record.id, &cost).await {
                    Ok(()) => {
                        summary.updated += 1;
                        tracing::debug!(
                            record_id = record.id,
                            cost = cost.total_cost,
                            resolved = cost.resolved,
                            failed = cost.failed,
                            "Applied reconciled cost"
                        );
                    }
                    Err(StoreError::NotFound(id)) => {
                        tracing::warn!(record_id = id, "Record vanished before cost was applied");
                    }
                    Err(e) => return Err(e.into()),
                },
                None => {
                    summary.failed += 1;
                    match self.store.increment_retry(record.id).await {
                        Ok(retries) if retries >= self.config.max_retries => {
                            summary.abandoned += 1;
                            tracing::info!(
                                record_id = record.id,
                                retries,
                                "Abandoning cost reconciliation after retry cap"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            summary.retry_errors += 1;
                            tracing::warn!(
                                record_id = record.id,
                                error = %e,
                                "Failed to increment retry count"
                            );
                        }
                    }
                }
            }
        }

        metrics::counter!("reconciler_records_updated_total").increment(summary.updated as u64);
        metrics::counter!("reconciler_records_failed_total").increment(summary.failed as u64);
        metrics::counter!("reconciler_records_abandoned_total")
            .increment(summary.abandoned as u64);

        Ok(summary)
    }

    /// Run one tick and fold its outcome into the backoff state.
    ///
    /// The tick runs on its own task, so a panic while processing a batch is
    /// reported as a failed tick instead of taking the worker down with it.
    pub async fn run_tick(&mut self) -> Result<TickSummary, ReconcileError> {
        let worker = self.clone();
        let result = match tokio::spawn(async move { worker.tick().await }).await {
            Ok(result) => result,
            Err(e) => Err(ReconcileError::Aborted(e.to_string())),
        };

        self.record_outcome(&result);
        result
    }

    fn record_outcome(&mut self, result: &Result<TickSummary, ReconcileError>) {
        match result {
            Ok(summary) => {
                self.backoff.record_success(&self.config);
                metrics::counter!("reconciler_ticks_total", "outcome" => "success").increment(1);
                if summary.updated > 0 {
                    tracing::info!(
                        updated = summary.updated,
                        failed = summary.failed,
                        "Updated events with cost data"
                    );
                } else {
                    tracing::debug!(fetched = summary.fetched, "Reconciliation tick completed");
                }
            }
            Err(e) => {
                let changed = self.backoff.record_failure(&self.config);
                metrics::counter!("reconciler_ticks_total", "outcome" => "error").increment(1);
                tracing::error!(
                    error = %e,
                    consecutive_errors = self.backoff.consecutive_errors(),
                    "Reconciliation tick failed"
                );
                if changed {
                    tracing::warn!(
                        poll_interval_seconds = self.backoff.cadence().as_secs(),
                        "Backing off reconciliation polling"
                    );
                }
            }
        }

        metrics::gauge!("reconciler_poll_interval_seconds")
            .set(self.backoff.cadence().as_secs_f64());
    }

    /// Start the reconciliation background task.
    ///
    /// Returns `None` without scheduling anything when the cost source has no
    /// credential. The task stops when `cancel_token` fires; a tick that is
    /// already running finishes first.
    pub fn start(mut self, cancel_token: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.source.is_configured() {
            tracing::info!("No pricing API key found, cost reconciler disabled");
            return None;
        }

        Some(tokio::spawn(async move {
            tracing::info!(
                poll_interval_seconds = self.config.poll_interval_seconds,
                batch_size = self.config.batch_size,
                store = self.store.name(),
                "Cost reconciler started"
            );

            loop {
                let cadence = self.backoff.cadence();
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Cost reconciler shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(cadence) => {
                        // Errors are already logged and folded into the backoff
                        let _ = self.run_tick().await;
                    }
                }
            }
        }))
    }
}
