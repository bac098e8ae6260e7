use serde::Deserialize;

/// Main configuration structure for Shelf-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Catalog source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Root URL of the catalog from which categories are discovered
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Optional cap on total stored records; traversal halts once reached
    #[serde(rename = "target-count")]
    pub target_count: Option<u64>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User agent string sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Delay between page fetches (milliseconds), a courtesy to the source
    #[serde(rename = "request-delay-ms", default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Attempts per page fetch before a transient failure becomes fatal
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Hard cap on listing pages fetched per category, guarding against a
    /// broken next-page detector looping forever
    #[serde(rename = "max-pages-per-category", default = "default_page_cap")]
    pub max_pages_per_category: u32,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Optional path for the flat-file CSV export
    #[serde(rename = "export-path")]
    pub export_path: Option<String>,
}

fn default_request_delay() -> u64 {
    250
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5000
}

fn default_page_cap() -> u32 {
    100
}
