//! Migrate command implementation

use crate::cli::serve::{connect_store, init_tracing, load_config_with_overrides};
use crate::cli::MigrateArgs;

/// Handle `cost-reconciler migrate`
///
/// Adds the reconciliation columns and the pending index to the collector's
/// existing events table. No other command alters the schema.
pub async fn run_migrate(args: MigrateArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.common)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let store = connect_store(&config).await?;
    let result = store.migrate().await;
    store.close().await;
    result?;

    Ok(format!(
        "✓ Reconciliation columns and index are present on {}",
        config.store.table_name
    ))
}
