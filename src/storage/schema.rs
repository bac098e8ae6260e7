//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Shelf-Harvest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track ingestion runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Ingested catalog items. The (title, category) uniqueness constraint is the
-- duplicate-suppression mechanism: inserts that violate it are rejected and
-- the first write wins.
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    price REAL NOT NULL CHECK (price >= 0),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    availability TEXT NOT NULL,
    category TEXT NOT NULL,
    image TEXT NOT NULL,
    ingested_run INTEGER NOT NULL REFERENCES runs(id),
    ingested_at TEXT NOT NULL,
    UNIQUE(title, category)
);

CREATE INDEX IF NOT EXISTS idx_items_category ON items(category);
CREATE INDEX IF NOT EXISTS idx_items_price ON items(price);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
