//! Crawler module for catalog ingestion
//!
//! This module contains the core ingestion logic, including:
//! - HTTP fetching with retry on transient failures
//! - Category discovery from the catalog root
//! - Listing-page extraction into item records
//! - Overall traversal coordination with a target-count stop condition

mod categories;
mod coordinator;
mod extractor;
mod fetcher;

pub use categories::{enumerate_categories, parse_categories, Category};
pub use coordinator::{run_ingestion, CancelFlag, Coordinator, IngestOutcome, IngestSummary};
pub use extractor::{extract_page, parse_listing, parse_price, rating_from_word, ListingPage};
pub use fetcher::{build_http_client, fetch_page, RetryPolicy};
