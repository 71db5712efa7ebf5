//! Cost reconciler - background cost resolution for agent telemetry
//!
//! Telemetry events are stored the moment an agent turn finishes, long before
//! the LLM provider has settled what the turn cost. This library finds those
//! cost-pending events, asks the provider for the billed cost of every
//! generation they reference, and writes the totals back.
//!
//! - [`pricing`] - one bounded lookup against the provider's generation endpoint
//! - [`reconciler`] - aggregation per record and the polling loop with backoff
//! - [`store`] - the record store gateway (PostgreSQL or in-memory)

pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod pricing;
pub mod reconciler;
pub mod store;
