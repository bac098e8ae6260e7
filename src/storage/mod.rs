//! Storage module for persisting ingested records
//!
//! This module handles all database operations for the ingestion pipeline:
//! - SQLite database initialization and schema management
//! - Item record persistence with duplicate suppression
//! - Read queries used by the downstream application layer
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{Store, StorageError, StorageResult};

/// One catalog item, as extracted from a listing page
///
/// Has no identity of its own; the store assigns a monotonic id on
/// successful insertion. The pair (title, category) is unique in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub title: String,
    pub price: f64,
    pub rating: u32,
    pub availability: String,
    pub category: String,
    pub image: String,
}

/// A persisted item record, as read back from the store
#[derive(Debug, Clone)]
pub struct StoredItem {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub rating: u32,
    pub availability: String,
    pub category: String,
    pub image: String,
    pub ingested_run: i64,
    pub ingested_at: String,
}

/// Outcome of an insert attempt
///
/// A duplicate (title, category) pair is an expected outcome, not an error;
/// the first write wins and the coordinator skips and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Record was newly inserted; carries the store-assigned id
    Inserted(i64),
    /// Record violated the (title, category) uniqueness invariant
    DuplicateRejected,
}

/// Represents an ingestion run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of an ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[RunStatus::Running, RunStatus::Completed, RunStatus::Failed] {
            let db_str = status.to_db_string();
            assert_eq!(Some(*status), RunStatus::from_db_string(db_str));
        }
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("invalid"), None);
    }
}
