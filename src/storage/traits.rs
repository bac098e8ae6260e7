//! Storage traits and error types

use crate::storage::{InsertOutcome, ItemRecord, RunRecord, RunStatus, StoredItem};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the record store backing the ingestion pipeline
///
/// The write surface required by the coordinator is deliberately small:
/// `count` and `insert`. The remaining read operations are the downstream
/// query interface consumed by the application layer. There is no update or
/// delete; records are immutable once ingested.
pub trait Store {
    // ===== Run Management =====

    /// Creates a new ingestion run, returning its id
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Ingestion =====

    /// Attempts to insert a record
    ///
    /// Returns `InsertOutcome::DuplicateRejected` when the (title, category)
    /// uniqueness constraint would be violated. That outcome is expected and
    /// non-fatal; any other failure surfaces as an error.
    fn insert(&mut self, record: &ItemRecord, run_id: i64) -> StorageResult<InsertOutcome>;

    /// Current number of stored records, used for the stop condition
    ///
    /// Always a live query against the store, never a cached value, so the
    /// target-count check cannot act on stale state.
    fn count(&self) -> StorageResult<u64>;

    /// Deletes all stored records (fresh-run support)
    fn clear_records(&mut self) -> StorageResult<()>;

    // ===== Downstream Read Queries =====

    /// Gets a record by its store-assigned id
    fn get_record(&self, id: i64) -> StorageResult<StoredItem>;

    /// Lists all records in insertion order
    fn list_all(&self) -> StorageResult<Vec<StoredItem>>;

    /// Lists records belonging to one category
    fn list_by_category(&self, category: &str) -> StorageResult<Vec<StoredItem>>;

    /// Finds records whose title matches exactly
    fn find_by_title(&self, title: &str) -> StorageResult<Vec<StoredItem>>;

    /// Lists records with price in [min, max]
    fn list_price_range(&self, min: f64, max: f64) -> StorageResult<Vec<StoredItem>>;

    /// Record count per category, sorted by category name
    fn count_by_category(&self) -> StorageResult<Vec<(String, u64)>>;
}
