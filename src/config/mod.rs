//! Configuration module for Shelf-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use shelf_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Catalog root: {}", config.catalog.root_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CatalogConfig, Config, CrawlerConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
