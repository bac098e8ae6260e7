//! Shelf-Harvest: a catalog ingestion pipeline
//!
//! This crate implements a crawler that walks a paginated, category-organized
//! book catalog, extracts structured item records from its HTML, and persists
//! them into a SQLite store with duplicate suppression on (title, category).

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for ingestion operations
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error for {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Page cap of {cap} exceeded in category '{category}'")]
    PageCapExceeded { category: String, cap: u32 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// True for errors caused by the remote catalog rather than local state.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            IngestError::Fetch { .. } | IngestError::HttpStatus { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_ingestion, CancelFlag, IngestOutcome, IngestSummary};
pub use storage::{InsertOutcome, ItemRecord};
