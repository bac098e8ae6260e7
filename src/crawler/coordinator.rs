//! Traversal coordinator - main ingestion orchestration logic
//!
//! Drives the whole pipeline: enumerate categories, walk each category's
//! listing pages, extract records, and persist them one at a time. The loop
//! mirrors the shape of the catalog:
//!
//! enumerate -> per category: fetch page -> extract -> persist each record
//!           -> check target -> next page or category done -> all done
//!
//! The target-count stop condition is evaluated against the live store count
//! before each category and before each record, never from a cached value,
//! so a configured target is hit exactly. Reaching it halts traversal
//! immediately, mid-page if need be, and is a success outcome. Fetch and
//! parse failures abort the run; duplicate inserts are skipped silently.

use crate::config::Config;
use crate::crawler::categories::{enumerate_categories, Category};
use crate::crawler::extractor::extract_page;
use crate::crawler::fetcher::{build_http_client, RetryPolicy};
use crate::storage::{InsertOutcome, RunStatus, SqliteStore, Store};
use crate::{IngestError, Result};
use reqwest::Client;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Cooperative cancellation handle for a running ingestion
///
/// Cloned into the host; setting it stops traversal at the next page or
/// record boundary. Partial state is safe to resume since insertion is
/// idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How an ingestion run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Every category was exhausted
    Completed,
    /// The configured target count was reached; traversal halted early
    TargetReached,
    /// The cancellation flag was raised
    Cancelled,
    /// The root page yielded no categories; zero work was performed.
    /// Distinct from a network failure, which is an error instead.
    NoCategories,
}

/// Summary of one ingestion run
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub outcome: IngestOutcome,
    pub categories: usize,
    pub pages_fetched: u64,
    pub inserted: u64,
    pub duplicates: u64,
    /// Store count after the run
    pub total_count: u64,
}

/// Why one category's traversal stopped
enum CategoryEnd {
    Exhausted,
    TargetReached,
    Cancelled,
}

/// Main ingestion coordinator
pub struct Coordinator {
    config: Config,
    store: SqliteStore,
    client: Client,
    root_url: Url,
    retry: RetryPolicy,
    run_id: i64,
    cancel: CancelFlag,
}

impl Coordinator {
    /// Creates a coordinator with default options
    pub fn new(config: Config, fresh: bool) -> Result<Self> {
        Self::with_options(config, fresh, "unhashed", CancelFlag::new())
    }

    /// Creates a coordinator, recording `config_hash` on the new run
    ///
    /// # Arguments
    ///
    /// * `config` - The ingestion configuration
    /// * `fresh` - Clear previously stored records before starting
    /// * `config_hash` - Hash of the configuration file, for run bookkeeping
    /// * `cancel` - Cancellation handle shared with the host
    pub fn with_options(
        config: Config,
        fresh: bool,
        config_hash: &str,
        cancel: CancelFlag,
    ) -> Result<Self> {
        let root_url = Url::parse(&config.catalog.root_url)?;

        let mut store = SqliteStore::new(Path::new(&config.output.database_path))?;
        if fresh {
            tracing::info!("Fresh run requested, clearing stored records");
            store.clear_records()?;
        }
        let run_id = store.create_run(config_hash)?;

        let client = build_http_client(&config.crawler.user_agent)?;
        let retry = RetryPolicy::from_config(&config.crawler);

        Ok(Self {
            config,
            store,
            client,
            root_url,
            retry,
            run_id,
            cancel,
        })
    }

    /// Runs the full ingestion
    ///
    /// On error the run is marked failed before the error is returned, so
    /// interrupted runs are visible in the runs table.
    pub async fn run(&mut self) -> Result<IngestSummary> {
        match self.run_inner().await {
            Ok(summary) => {
                self.store.complete_run(self.run_id)?;
                Ok(summary)
            }
            Err(e) => {
                if let Err(mark_err) = self.store.update_run_status(self.run_id, RunStatus::Failed)
                {
                    tracing::error!("Failed to mark run {} as failed: {}", self.run_id, mark_err);
                }
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self) -> Result<IngestSummary> {
        tracing::info!(
            "Starting ingestion run {} from {}",
            self.run_id,
            self.root_url
        );
        let start_time = std::time::Instant::now();

        let categories =
            enumerate_categories(&self.client, &self.root_url, self.retry).await?;

        let mut summary = IngestSummary {
            outcome: IngestOutcome::Completed,
            categories: categories.len(),
            pages_fetched: 0,
            inserted: 0,
            duplicates: 0,
            total_count: 0,
        };

        if categories.is_empty() {
            tracing::warn!("Root page yielded no categories; nothing to ingest");
            summary.outcome = IngestOutcome::NoCategories;
            summary.total_count = self.store.count()?;
            return Ok(summary);
        }

        tracing::info!("Discovered {} categories", categories.len());

        for category in &categories {
            if self.cancel.is_cancelled() {
                summary.outcome = IngestOutcome::Cancelled;
                break;
            }
            if self.target_reached()? {
                summary.outcome = IngestOutcome::TargetReached;
                break;
            }

            match self.ingest_category(category, &mut summary).await? {
                CategoryEnd::Exhausted => {
                    tracing::debug!("Category '{}' exhausted", category.name);
                }
                CategoryEnd::TargetReached => {
                    summary.outcome = IngestOutcome::TargetReached;
                    break;
                }
                CategoryEnd::Cancelled => {
                    summary.outcome = IngestOutcome::Cancelled;
                    break;
                }
            }
        }

        summary.total_count = self.store.count()?;
        tracing::info!(
            "Ingestion run {} finished ({:?}): {} pages, {} inserted, {} duplicates, {} total in {:?}",
            self.run_id,
            summary.outcome,
            summary.pages_fetched,
            summary.inserted,
            summary.duplicates,
            summary.total_count,
            start_time.elapsed()
        );

        Ok(summary)
    }

    /// Walks one category's listing pages until exhaustion, target, cap or
    /// cancellation
    async fn ingest_category(
        &mut self,
        category: &Category,
        summary: &mut IngestSummary,
    ) -> Result<CategoryEnd> {
        let mut page_url = self.root_url.join(&category.path)?;
        let mut pages_in_category: u32 = 0;
        let cap = self.config.crawler.max_pages_per_category;

        tracing::info!("Ingesting category '{}'", category.name);

        loop {
            if pages_in_category >= cap {
                return Err(IngestError::PageCapExceeded {
                    category: category.name.clone(),
                    cap,
                });
            }

            let listing = extract_page(
                &self.client,
                &page_url,
                &self.root_url,
                &category.name,
                self.retry,
            )
            .await?;
            pages_in_category += 1;
            summary.pages_fetched += 1;

            tracing::debug!(
                "Page {} of '{}': {} records",
                pages_in_category,
                category.name,
                listing.records.len()
            );

            for record in &listing.records {
                if self.cancel.is_cancelled() {
                    return Ok(CategoryEnd::Cancelled);
                }
                if self.target_reached()? {
                    return Ok(CategoryEnd::TargetReached);
                }

                match self.store.insert(record, self.run_id)? {
                    InsertOutcome::Inserted(_) => summary.inserted += 1,
                    InsertOutcome::DuplicateRejected => {
                        tracing::debug!(
                            "Duplicate skipped: '{}' in '{}'",
                            record.title,
                            record.category
                        );
                        summary.duplicates += 1;
                    }
                }
            }

            match listing.next_page {
                Some(next) if !self.target_reached()? => {
                    if self.cancel.is_cancelled() {
                        return Ok(CategoryEnd::Cancelled);
                    }
                    let delay = self.config.crawler.request_delay_ms;
                    if delay > 0 {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                    page_url = next;
                }
                Some(_) => return Ok(CategoryEnd::TargetReached),
                None => return Ok(CategoryEnd::Exhausted),
            }
        }
    }

    /// Evaluates the stop condition against the live store count
    fn target_reached(&self) -> Result<bool> {
        match self.config.catalog.target_count {
            Some(target) => Ok(self.store.count()? >= target),
            None => Ok(false),
        }
    }

    /// Read access to the underlying store, for the host application
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }
}

/// Runs a complete ingestion with default options
///
/// This is the main library entry point. It will:
/// 1. Open the record store
/// 2. Create an ingestion run
/// 3. Enumerate the catalog's categories
/// 4. Walk every category's listing pages, persisting records one at a time
/// 5. Stop early if the configured target count is reached
///
/// # Arguments
///
/// * `config` - The ingestion configuration
///
/// # Returns
///
/// * `Ok(IngestSummary)` - How the run ended and what it ingested
/// * `Err(IngestError)` - Fetch, parse, or storage failure
pub async fn run_ingestion(config: Config) -> Result<IngestSummary> {
    let mut coordinator = Coordinator::new(config, false)?;
    coordinator.run().await
}
