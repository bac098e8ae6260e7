use crate::config::types::{CatalogConfig, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates catalog configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "root-url must use http or https scheme, got '{}'",
            url.scheme()
        )));
    }

    if let Some(target) = config.target_count {
        if target == 0 {
            return Err(ConfigError::Validation(
                "target-count must be >= 1 when set; omit it for an unbounded run".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.max_pages_per_category < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages-per-category must be >= 1, got {}",
            config.max_pages_per_category
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if let Some(export) = &config.export_path {
        if export.is_empty() {
            return Err(ConfigError::Validation(
                "export-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{CatalogConfig, CrawlerConfig, OutputConfig};

    fn valid_config() -> Config {
        Config {
            catalog: CatalogConfig {
                root_url: "https://books.toscrape.com/".to_string(),
                target_count: None,
            },
            crawler: CrawlerConfig {
                user_agent: "ShelfHarvest/1.0".to_string(),
                request_delay_ms: 250,
                max_retries: 3,
                retry_delay_ms: 5000,
                max_pages_per_category: 100,
            },
            output: OutputConfig {
                database_path: "./books.db".to_string(),
                export_path: None,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_invalid_root_url() {
        let mut config = valid_config();
        config.catalog.root_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut config = valid_config();
        config.catalog.root_url = "ftp://books.toscrape.com/".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_target_rejected() {
        let mut config = valid_config();
        config.catalog.target_count = Some(0);
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let mut config = valid_config();
        config.crawler.user_agent = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_page_cap_rejected() {
        let mut config = valid_config();
        config.crawler.max_pages_per_category = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let mut config = valid_config();
        config.output.database_path = String::new();
        assert!(validate(&config).is_err());
    }
}
