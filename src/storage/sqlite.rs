//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, Store};
use crate::storage::{InsertOutcome, ItemRecord, RunRecord, RunStatus, StoredItem};
use crate::IngestError;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

/// SQLite record store
pub struct SqliteStore {
    conn: Connection,
}

const ITEM_COLUMNS: &str =
    "id, title, price, rating, availability, category, image, ingested_run, ingested_at";

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<StoredItem> {
    Ok(StoredItem {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        rating: row.get(3)?,
        availability: row.get(4)?,
        category: row.get(5)?,
        image: row.get(6)?,
        ingested_run: row.get(7)?,
        ingested_at: row.get(8)?,
    })
}

impl SqliteStore {
    /// Opens or creates the database at the given path
    pub fn new(path: &Path) -> Result<Self, IngestError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, IngestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status
             FROM runs ORDER BY id DESC LIMIT 1",
        )?;

        let run = stmt
            .query_row([], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    config_hash: row.get(3)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                        .unwrap_or(RunStatus::Running),
                })
            })
            .optional()?;

        Ok(run)
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Completed.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Ingestion =====

    fn insert(&mut self, record: &ItemRecord, run_id: i64) -> StorageResult<InsertOutcome> {
        let now = Utc::now().to_rfc3339();
        let result = self.conn.execute(
            "INSERT INTO items (title, price, rating, availability, category, image, ingested_run, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.title,
                record.price,
                record.rating,
                record.availability,
                record.category,
                record.image,
                run_id,
                now
            ],
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid())),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Ok(InsertOutcome::DuplicateRejected)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn clear_records(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM items", [])?;
        Ok(())
    }

    // ===== Downstream Read Queries =====

    fn get_record(&self, id: i64) -> StorageResult<StoredItem> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS))?;

        stmt.query_row(params![id], row_to_item)
            .map_err(|_| StorageError::RecordNotFound(id))
    }

    fn list_all(&self) -> StorageResult<Vec<StoredItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM items ORDER BY id", ITEM_COLUMNS))?;

        let items = stmt
            .query_map([], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn list_by_category(&self, category: &str) -> StorageResult<Vec<StoredItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items WHERE category = ?1 ORDER BY id",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map(params![category], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn find_by_title(&self, title: &str) -> StorageResult<Vec<StoredItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items WHERE title = ?1 ORDER BY id",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map(params![title], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn list_price_range(&self, min: f64, max: f64) -> StorageResult<Vec<StoredItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items WHERE price BETWEEN ?1 AND ?2 ORDER BY id",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map(params![min, max], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn count_by_category(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) FROM items GROUP BY category ORDER BY category",
        )?;

        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}
