//! # Metrics Export
//!
//! Counters and gauges are emitted through the `metrics` facade wherever the
//! work happens; this module only installs the Prometheus exporter.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `reconciler_ticks_total{outcome}` - Completed ticks by outcome
//! - `reconciler_records_updated_total` - Records that received a cost
//! - `reconciler_records_failed_total` - Records where every lookup failed
//! - `reconciler_records_abandoned_total` - Records that reached the retry cap
//! - `reconciler_pricing_requests_total{outcome}` - Provider lookups by outcome
//!
//! **Histograms:**
//! - `reconciler_pricing_latency_seconds` - Provider lookup duration
//!
//! **Gauges:**
//! - `reconciler_poll_interval_seconds` - Current delay between ticks

use crate::config::MetricsConfig;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;

/// Lookup latency buckets in seconds, topping out at the default timeout.
const LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Register help text for every exported metric.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "reconciler_ticks_total",
        "Reconciliation ticks by outcome (success, error)"
    );
    metrics::describe_counter!(
        "reconciler_records_updated_total",
        "Records whose cost was written back"
    );
    metrics::describe_counter!(
        "reconciler_records_failed_total",
        "Records where no generation cost could be resolved"
    );
    metrics::describe_counter!(
        "reconciler_records_abandoned_total",
        "Records that reached the retry cap"
    );
    metrics::describe_counter!(
        "reconciler_pricing_requests_total",
        "Pricing provider lookups by outcome"
    );
    metrics::describe_histogram!(
        "reconciler_pricing_latency_seconds",
        metrics::Unit::Seconds,
        "Pricing provider lookup duration"
    );
    metrics::describe_gauge!(
        "reconciler_poll_interval_seconds",
        metrics::Unit::Seconds,
        "Current delay between reconciliation ticks"
    );
}

/// Install the Prometheus exporter with its own scrape listener.
///
/// Must be called from within a tokio runtime.
pub fn setup_metrics(config: &MetricsConfig) -> Result<SocketAddr, Box<dyn std::error::Error>> {
    let addr: SocketAddr = config.listen_addr.parse()?;

    builder()?.with_http_listener(addr).install()?;
    describe_metrics();

    Ok(addr)
}

fn builder() -> Result<PrometheusBuilder, Box<dyn std::error::Error>> {
    Ok(PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("reconciler_pricing_latency_seconds".to_string()),
        LATENCY_BUCKETS,
    )?)
}
