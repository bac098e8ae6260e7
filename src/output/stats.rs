//! Statistics generation from the record store
//!
//! This module provides functionality for extracting and displaying
//! store statistics for the --stats mode.

use crate::storage::{RunRecord, Store};
use crate::IngestError;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of ingested records
    pub total_records: u64,

    /// Record count per category, sorted by category name
    pub records_by_category: Vec<(String, u64)>,

    /// Most recent ingestion run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from the store
pub fn load_statistics(store: &dyn Store) -> Result<StoreStatistics, IngestError> {
    Ok(StoreStatistics {
        total_records: store.count()?,
        records_by_category: store.count_by_category()?,
        latest_run: store.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Total records: {}", stats.total_records);
    println!();

    println!("Records by Category ({}):", stats.records_by_category.len());
    for (category, count) in &stats.records_by_category {
        let percentage = if stats.total_records > 0 {
            (*count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", category, count, percentage);
    }
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  Id: {}", run.id);
            println!("  Started: {}", run.started_at);
            println!(
                "  Finished: {}",
                run.finished_at.as_deref().unwrap_or("(still running)")
            );
            println!("  Status: {}", run.status.to_db_string());
        }
        None => println!("No ingestion runs recorded yet"),
    }
}
