//! Pending command implementation

use crate::cli::output::{format_pending_json, format_pending_table};
use crate::cli::serve::{connect_store, load_config_with_overrides};
use crate::cli::PendingArgs;
use crate::store::RecordStore;

/// List pending records from any store.
pub async fn handle_pending(
    store: &dyn RecordStore,
    limit: usize,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let records = store.fetch_pending(limit).await?;

    if json {
        Ok(format_pending_json(&records)?)
    } else {
        Ok(format_pending_table(&records, chrono::Utc::now()))
    }
}

/// Handle `cost-reconciler pending`
pub async fn run_pending(args: PendingArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.common)?;
    config.validate()?;

    let store = connect_store(&config).await?;
    let limit = args.limit.unwrap_or(config.worker.batch_size);

    let output = handle_pending(&store, limit, args.json).await;
    store.close().await;
    output
}
