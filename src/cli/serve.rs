//! Serve command implementation

use crate::cli::{CommonArgs, ServeArgs};
use crate::config::{ConfigError, LogFormat, LoggingConfig, ReconcilerConfig};
use crate::pricing::{CostSource, PricingClient, PricingConfig};
use crate::reconciler::CostReconciler;
use crate::store::PostgresStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &CommonArgs,
) -> Result<ReconcilerConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        ReconcilerConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        ReconcilerConfig::default()
    };

    // Apply environment variable overrides
    config = config.with_env_overrides();

    // Apply CLI overrides (highest priority)
    if let Some(ref url) = args.database_url {
        config.store.database_url = Some(url.clone());
    }
    if let Some(ref url) = args.pricing_url {
        config.pricing.base_url = url.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Initialize tracing based on configuration
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}

/// Build the pricing client and report where its credential came from.
pub fn build_pricing_client(config: &PricingConfig) -> PricingClient {
    let client = PricingClient::new(config);
    match client.credential() {
        Some(credential) => tracing::info!(
            source = ?credential.source(),
            env_var = credential.env_var(),
            base_url = %config.base_url,
            "Pricing credential resolved"
        ),
        None => tracing::warn!(
            primary = %config.api_key_env,
            fallback = %config.fallback_api_key_env,
            "No pricing credential in the environment"
        ),
    }
    client
}

/// Connect to the record store.
///
/// Never changes the schema; that is `cost-reconciler migrate`'s job.
pub async fn connect_store(
    config: &ReconcilerConfig,
) -> Result<PostgresStore, Box<dyn std::error::Error>> {
    let url = config
        .store
        .database_url
        .as_deref()
        .ok_or_else(|| ConfigError::MissingField("store.database_url (or DATABASE_URL)".into()))?;

    let store =
        PostgresStore::connect(url, &config.store, config.worker.pending_policy()).await?;

    tracing::info!(table = %config.store.table_name, "Connected to record store");
    Ok(store)
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and merge configuration
    let mut config = load_config_with_overrides(&args.common)?;
    if let Some(interval) = args.poll_interval {
        config.worker.poll_interval_seconds = interval;
    }
    if args.metrics {
        config.metrics.enabled = true;
    }
    if args.no_worker {
        config.worker.enabled = false;
    }
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting cost reconciler");
    tracing::debug!(pricing = ?config.pricing, worker = ?config.worker, "Loaded configuration");

    // 3. Metrics exporter (if enabled)
    if config.metrics.enabled {
        let addr = crate::metrics::setup_metrics(&config.metrics)?;
        tracing::info!(addr = %addr, "Prometheus metrics listening");
    }

    // 4. Start the worker (if enabled and a credential exists)
    let cancel_token = CancellationToken::new();
    let mut store = None;
    let worker_handle = if config.worker.enabled {
        let source = Arc::new(build_pricing_client(&config.pricing));
        if source.is_configured() {
            let connected = Arc::new(connect_store(&config).await?);
            store = Some(Arc::clone(&connected));
            CostReconciler::new(connected, source, config.worker.clone())
                .start(cancel_token.clone())
        } else {
            tracing::info!("No pricing API key found, cost reconciler disabled");
            None
        }
    } else {
        tracing::info!("Reconciliation worker disabled");
        None
    };

    // 5. Run until signalled
    shutdown_signal(cancel_token.clone()).await;

    // 6. Cleanup
    if let Some(handle) = worker_handle {
        tracing::info!("Waiting for cost reconciler to stop");
        handle.await?;
    }
    if let Some(store) = store {
        store.close().await;
    }

    tracing::info!("Cost reconciler stopped");
    Ok(())
}
