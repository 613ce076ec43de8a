//! Known-tower cache maintenance commands.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use towerlens::config::ConfigFile;
use towerlens::known::{FileKnownStore, KnownCacheError, TowerKnownCache};

use crate::error::CliError;

/// Known-tower cache subcommands.
#[derive(Debug, Subcommand)]
pub enum KnownAction {
    /// List known towers, most recently seen first
    List {
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Remove towers not seen within the retention window
    Prune,
    /// Remove every known tower
    Clear,
}

/// Run a known-tower subcommand.
pub async fn run(action: KnownAction, config: &ConfigFile) -> Result<(), CliError> {
    let path = config.known.path.clone();
    let store = tokio::task::spawn_blocking(move || FileKnownStore::open(path))
        .await
        .map_err(|e| KnownCacheError::TaskFailed(e.to_string()))??;
    let cache = TowerKnownCache::new(Arc::new(store));

    match action {
        KnownAction::List { limit } => {
            let entries = cache.entries().await?;
            println!("Known towers: {}", config.known.path.display());
            if entries.is_empty() {
                println!("  (none)");
                return Ok(());
            }
            let shown = limit.unwrap_or(entries.len());
            for entry in entries.iter().take(shown) {
                println!(
                    "  {:<32} {}",
                    entry.key.to_string(),
                    entry.last_seen.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            if shown < entries.len() {
                println!("  ... {} more", entries.len() - shown);
            }
        }
        KnownAction::Prune => {
            let cutoff = prune_cutoff(Utc::now(), config.known.retention())?;
            let removed = cache.prune_older_than(cutoff).await?;
            println!(
                "Removed {} towers not seen in the last {} hours",
                removed, config.known.retention_hours
            );
        }
        KnownAction::Clear => {
            let count = cache.len().await?;
            cache.clear_all().await?;
            println!("Removed {} known towers", count);
        }
    }

    Ok(())
}

fn prune_cutoff(now: DateTime<Utc>, retention: Duration) -> Result<DateTime<Utc>, CliError> {
    now.checked_sub_signed(retention).ok_or_else(|| {
        CliError::InvalidArgument(format!(
            "retention window of {} hours is out of range",
            retention.num_hours()
        ))
    })
}
