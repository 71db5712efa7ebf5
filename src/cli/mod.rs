//! CLI module for the cost reconciler
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Run the reconciliation worker until SIGINT/SIGTERM
//! - `once` - Run a single reconciliation tick and print its summary
//! - `pending` - List records still waiting for a cost
//! - `migrate` - Add the reconciliation columns and index to the events table
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Prepare the collector database once
//! DATABASE_URL=postgres://localhost/telemetry cost-reconciler migrate
//!
//! # Run the worker against the collector database
//! DATABASE_URL=postgres://localhost/telemetry cost-reconciler serve
//!
//! # Inspect the backlog
//! cost-reconciler pending --json
//!
//! # Generate shell completions
//! cost-reconciler completions bash > ~/.bash_completion.d/cost-reconciler
//! ```

pub mod completions;
pub mod config;
pub mod migrate;
pub mod once;
pub mod output;
pub mod pending;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Cost reconciler - resolves provider-billed costs for stored telemetry events
#[derive(Parser, Debug)]
#[command(
    name = "cost-reconciler",
    version,
    about = "Background cost reconciliation for agent telemetry events"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the reconciliation worker
    Serve(ServeArgs),
    /// Run a single reconciliation tick
    Once(OnceArgs),
    /// List records waiting for a cost
    Pending(PendingArgs),
    /// Add the reconciliation columns and index to the events table
    Migrate(MigrateArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that talks to the store.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "reconciler.toml")]
    pub config: PathBuf,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Override the pricing provider base URL
    #[arg(long, env = "RECONCILER_PRICING_URL")]
    pub pricing_url: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RECONCILER_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Override the base delay between ticks, in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Expose Prometheus metrics
    #[arg(long)]
    pub metrics: bool,

    /// Start without the reconciliation worker
    #[arg(long)]
    pub no_worker: bool,
}

#[derive(Args, Debug)]
pub struct OnceArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PendingArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Maximum records to list (defaults to the worker batch size)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "reconciler.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["cost-reconciler", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.common.config, PathBuf::from("reconciler.toml"));
                assert!(args.poll_interval.is_none());
                assert!(!args.metrics);
                assert!(!args.no_worker);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "cost-reconciler",
            "serve",
            "-c",
            "custom.toml",
            "--poll-interval",
            "30",
            "--metrics",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.common.config, PathBuf::from("custom.toml"));
                assert_eq!(args.poll_interval, Some(30));
                assert!(args.metrics);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_once_json() {
        let cli = Cli::try_parse_from(["cost-reconciler", "once", "--json"]).unwrap();
        match cli.command {
            Commands::Once(args) => assert!(args.json),
            _ => panic!("Expected Once command"),
        }
    }

    #[test]
    fn test_cli_parse_pending_limit() {
        let cli = Cli::try_parse_from(["cost-reconciler", "pending", "-n", "5"]).unwrap();
        match cli.command {
            Commands::Pending(args) => {
                assert_eq!(args.limit, Some(5));
                assert!(!args.json);
            }
            _ => panic!("Expected Pending command"),
        }
    }

    #[test]
    fn test_cli_parse_database_url_flag() {
        let cli = Cli::try_parse_from([
            "cost-reconciler",
            "pending",
            "--database-url",
            "postgres://localhost/telemetry",
        ])
        .unwrap();
        match cli.command {
            Commands::Pending(args) => assert_eq!(
                args.common.database_url.as_deref(),
                Some("postgres://localhost/telemetry")
            ),
            _ => panic!("Expected Pending command"),
        }
    }

    #[test]
    fn test_cli_parse_migrate() {
        let cli = Cli::try_parse_from(["cost-reconciler", "migrate", "-c", "prod.toml"]).unwrap();
        match cli.command {
            Commands::Migrate(args) => {
                assert_eq!(args.common.config, PathBuf::from("prod.toml"))
            }
            _ => panic!("Expected Migrate command"),
        }
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli = Cli::try_parse_from(["cost-reconciler", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init(args)) => assert!(args.force),
            _ => panic!("Expected Config Init command"),
        }
    }
}
