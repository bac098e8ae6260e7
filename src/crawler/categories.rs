//! Category enumeration
//!
//! Discovers the catalog's categories from its root page. Category links are
//! the anchors whose href lives under the category path segment; the anchor
//! text is the category display name and the href, minus the trailing index
//! page, is the relative path of the category's first listing page.
//!
//! The catalog also carries one aggregate "Books" pseudo-category that lists
//! every item; it is not a real category and is dropped from the result.

use crate::crawler::fetcher::{fetch_page, RetryPolicy};
use crate::{IngestError, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Path segment identifying category links on the root page
const CATEGORY_PATH_SEGMENT: &str = "catalogue/category";

/// Label of the catalog-wide aggregate listing, excluded from enumeration
const AGGREGATE_LABEL: &str = "Books";

/// Index-page filename stripped from category start paths
const INDEX_FILENAME: &str = "index.html";

/// One discovered category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name, e.g. "Travel"
    pub name: String,
    /// Relative path of the first listing page, e.g.
    /// "catalogue/category/books/travel_2/"
    pub path: String,
}

/// Parses the catalog root page into its list of categories
///
/// Returns categories in document order, deduplicated by name (first
/// occurrence wins). A page with no recognizable category links yields an
/// empty list, not an error; only transport failures are errors, and those
/// happen in [`enumerate_categories`] before this function is reached.
pub fn parse_categories(html: &str) -> Result<Vec<Category>> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").map_err(|e| IngestError::Parse {
        url: String::new(),
        message: format!("bad selector: {}", e),
    })?;

    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for anchor in document.select(&anchor_selector) {
        let href = match anchor.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if !href.trim_start_matches('/').starts_with(CATEGORY_PATH_SEGMENT) {
            continue;
        }

        let name = anchor.text().collect::<String>().trim().to_string();
        if name.is_empty() || name == AGGREGATE_LABEL {
            continue;
        }

        if !seen.insert(name.clone()) {
            continue;
        }

        let path = href
            .strip_suffix(INDEX_FILENAME)
            .unwrap_or(href)
            .to_string();

        categories.push(Category { name, path });
    }

    Ok(categories)
}

/// Fetches the catalog root and enumerates its categories
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `root_url` - The catalog root URL
/// * `retry` - Retry policy for the root fetch
///
/// # Returns
///
/// * `Ok(Vec<Category>)` - Discovered categories, possibly empty
/// * `Err(IngestError)` - Transport/HTTP failure reaching the root
pub async fn enumerate_categories(
    client: &Client,
    root_url: &Url,
    retry: RetryPolicy,
) -> Result<Vec<Category>> {
    let html = fetch_page(client, root_url, retry).await?;
    parse_categories(&html)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT_HTML: &str = r#"
        <html><body>
        <ul class="nav nav-list">
            <li><a href="catalogue/category/books_1/index.html">Books</a>
                <ul>
                    <li><a href="catalogue/category/books/travel_2/index.html">Travel</a></li>
                    <li><a href="catalogue/category/books/mystery_3/index.html">Mystery</a></li>
                    <li><a href="catalogue/category/books/poetry_23/index.html">Poetry</a></li>
                </ul>
            </li>
        </ul>
        <a href="catalogue/a-light-in-the-attic_1000/index.html">A Light in the Attic</a>
        <a href="https://example.com/elsewhere">Elsewhere</a>
        </body></html>
    "#;

    #[test]
    fn test_enumerates_genuine_categories_only() {
        let categories = parse_categories(ROOT_HTML).unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Travel", "Mystery", "Poetry"]);
    }

    #[test]
    fn test_aggregate_books_entry_excluded() {
        let categories = parse_categories(ROOT_HTML).unwrap();
        assert!(categories.iter().all(|c| c.name != "Books"));
    }

    #[test]
    fn test_index_filename_stripped() {
        let categories = parse_categories(ROOT_HTML).unwrap();
        assert_eq!(categories[0].path, "catalogue/category/books/travel_2/");
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let html = r#"
            <a href="catalogue/category/books/travel_2/index.html">Travel</a>
            <a href="catalogue/category/books/travel_99/index.html">Travel</a>
        "#;
        let categories = parse_categories(html).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].path, "catalogue/category/books/travel_2/");
    }

    #[test]
    fn test_no_anchors_yields_empty() {
        let categories = parse_categories("<html><body><p>nothing here</p></body></html>").unwrap();
        assert!(categories.is_empty());
    }

    #[test]
    fn test_no_category_links_yields_empty() {
        let html = r#"<a href="/about">About</a><a href="/contact">Contact</a>"#;
        assert!(parse_categories(html).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enumerate_over_http() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ROOT_HTML))
            .mount(&server)
            .await;

        let client = crate::crawler::build_http_client("TestHarvester/1.0").unwrap();
        let root = Url::parse(&format!("{}/", server.uri())).unwrap();
        let categories = enumerate_categories(&client, &root, RetryPolicy::none())
            .await
            .unwrap();
        assert_eq!(categories.len(), 3);
    }

    #[tokio::test]
    async fn test_enumerate_transport_failure_is_error() {
        let client = crate::crawler::build_http_client("TestHarvester/1.0").unwrap();
        // Reserved port with nothing listening
        let root = Url::parse("http://127.0.0.1:9/").unwrap();
        let result = enumerate_categories(&client, &root, RetryPolicy::none()).await;
        assert!(matches!(result, Err(IngestError::Fetch { .. })));
    }
}
