//! TowerLens CLI - Command-line interface
//!
//! Queries the tower backend for a viewport, classifies observed towers and
//! maintains the local known-tower cache.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use towerlens::logging::{self, LogOptions};

use commands::classify::ClassifyArgs;
use commands::config::ConfigCommands;
use commands::known::KnownAction;
use commands::query::QueryArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "towerlens")]
#[command(version = towerlens::VERSION)]
#[command(about = "Viewport-driven cell tower cache and new-tower classifier", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.towerlens/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and list the towers inside a viewport
    Query(QueryArgs),

    /// Classify an observed tower as new or known
    Classify(ClassifyArgs),

    /// Inspect or maintain the known-tower cache
    Known {
        #[command(subcommand)]
        action: KnownAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = commands::common::load_config(cli.config.as_deref())?;

    let _log_guard = logging::init(LogOptions {
        directory: config.logging.directory.as_deref(),
        default_filter: Some(if cli.verbose { "debug" } else { "warn" }),
    })?;

    let command = match cli.command {
        Commands::Config { command } => {
            commands::config::run(command, &config, cli.config.as_deref());
            return Ok(());
        }
        other => other,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async {
        match command {
            Commands::Query(args) => commands::query::run(args, &config).await,
            Commands::Classify(args) => commands::classify::run(args, &config).await,
            Commands::Known { action } => commands::known::run(action, &config).await,
            Commands::Config { .. } => Ok(()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_with_negative_longitudes() {
        let cli = Cli::try_parse_from([
            "towerlens", "query", "--north", "47.7", "--south", "47.6", "--east", "-122.2",
            "--west", "-122.3", "--zoom", "13", "--radio", "lte",
        ])
        .unwrap();
        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.west, -122.3);
                assert_eq!(args.radio, Some(commands::common::RadioArg::Lte));
            }
            _ => panic!("expected query"),
        }
    }

    #[test]
    fn test_operator_filter_needs_both_codes() {
        let result = Cli::try_parse_from([
            "towerlens", "query", "--north", "1", "--south", "0", "--east", "1", "--west", "0",
            "--mcc", "310",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_known_list() {
        let cli = Cli::try_parse_from(["towerlens", "known", "list", "--limit", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Known {
                action: KnownAction::List { limit: Some(5) }
            }
        ));
    }
}
