//! Shelf-Harvest main entry point
//!
//! Command-line interface around the catalog ingestion pipeline.

use anyhow::Context;
use clap::Parser;
use shelf_harvest::config::load_config_with_hash;
use shelf_harvest::crawler::{CancelFlag, Coordinator, IngestOutcome};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Harvest: a catalog ingestion pipeline
///
/// Walks a paginated, category-organized book catalog, extracts item
/// records, and persists them into a SQLite store with duplicate
/// suppression on (title, category).
#[derive(Parser, Debug)]
#[command(name = "shelf-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A catalog ingestion pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Clear previously stored records before ingesting
    #[arg(long)]
    fresh: bool,

    /// Override the configured target record count
    #[arg(long, value_name = "N")]
    target: Option<u64>,

    /// Show statistics from the store and exit
    #[arg(long, conflicts_with = "export_csv")]
    stats: bool,

    /// Export all stored records to the configured CSV path and exit
    #[arg(long, conflicts_with = "stats")]
    export_csv: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if let Some(target) = cli.target {
        config.catalog.target_count = Some(target);
    }

    if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_csv {
        handle_export(&config)?;
    } else {
        handle_ingest(config, &config_hash, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_harvest=info,warn"),
            1 => EnvFilter::new("shelf_harvest=debug,info"),
            2 => EnvFilter::new("shelf_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --stats mode: shows statistics from the store
fn handle_stats(config: &shelf_harvest::config::Config) -> anyhow::Result<()> {
    use shelf_harvest::output::{load_statistics, print_statistics};
    use shelf_harvest::storage::SqliteStore;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-csv mode: dumps the record set to a CSV file
fn handle_export(config: &shelf_harvest::config::Config) -> anyhow::Result<()> {
    use shelf_harvest::output::export_csv;
    use shelf_harvest::storage::SqliteStore;
    use std::path::Path;

    let export_path = config
        .output
        .export_path
        .as_deref()
        .context("export-path is not set in the configuration")?;

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let count = export_csv(&store, Path::new(export_path))?;
    println!("Exported {} records to {}", count, export_path);

    Ok(())
}

/// Handles the main ingestion operation
async fn handle_ingest(
    config: shelf_harvest::config::Config,
    config_hash: &str,
    fresh: bool,
) -> anyhow::Result<()> {
    match config.catalog.target_count {
        Some(target) => tracing::info!("Target record count: {}", target),
        None => tracing::info!("No target count set, ingesting until exhaustion"),
    }

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after current record");
                cancel.cancel();
            }
        });
    }

    let mut coordinator = Coordinator::with_options(config, fresh, config_hash, cancel)
        .context("failed to initialize ingestion")?;

    let summary = coordinator
        .run()
        .await
        .context("ingestion aborted on fetch/parse failure")?;

    match summary.outcome {
        IngestOutcome::Completed => {
            println!(
                "✓ All {} categories exhausted: {} inserted, {} duplicates skipped, {} total",
                summary.categories, summary.inserted, summary.duplicates, summary.total_count
            );
        }
        IngestOutcome::TargetReached => {
            println!(
                "✓ Target reached: stopped early at {} stored records ({} inserted this run)",
                summary.total_count, summary.inserted
            );
        }
        IngestOutcome::Cancelled => {
            println!(
                "Ingestion cancelled: {} inserted before stopping, safe to resume",
                summary.inserted
            );
        }
        IngestOutcome::NoCategories => {
            println!("No categories found on the catalog root; nothing ingested");
        }
    }

    Ok(())
}
