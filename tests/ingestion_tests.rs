//! Integration tests for the ingestion pipeline
//!
//! These tests use wiremock to serve a small fake catalog and exercise the
//! full ingestion cycle end-to-end: category discovery, pagination,
//! extraction, duplicate suppression, and the target-count stop condition.

use shelf_harvest::config::{CatalogConfig, Config, CrawlerConfig, OutputConfig};
use shelf_harvest::crawler::{CancelFlag, Coordinator};
use shelf_harvest::storage::{RunStatus, Store};
use shelf_harvest::{IngestError, IngestOutcome};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock catalog
fn test_config(root_url: &str, db_path: &str, target: Option<u64>) -> Config {
    Config {
        catalog: CatalogConfig {
            root_url: root_url.to_string(),
            target_count: target,
        },
        crawler: CrawlerConfig {
            user_agent: "ShelfHarvestTest/1.0".to_string(),
            request_delay_ms: 0,
            max_retries: 1,
            retry_delay_ms: 0,
            max_pages_per_category: 10,
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
            export_path: None,
        },
    }
}

fn item_block(title: &str, price: &str, rating: &str) -> String {
    format!(
        r#"<article class="product_pod">
            <div class="image_container">
                <a><img src="../../../../media/cache/{title}.jpg" class="thumbnail"></a>
            </div>
            <p class="star-rating {rating}"></p>
            <h3><a href="{title}.html" title="{title}">{title}</a></h3>
            <div class="product_price">
                <p class="price_color">{price}</p>
                <p class="instock availability">In stock</p>
            </div>
        </article>"#
    )
}

fn listing_page(items: &[String], next: Option<&str>) -> String {
    let pager = next
        .map(|href| format!(r#"<ul class="pager"><li class="next"><a href="{}">next</a></li></ul>"#, href))
        .unwrap_or_default();
    format!("<html><body><section>{}</section>{}</body></html>", items.join("\n"), pager)
}

const ROOT_HTML: &str = r#"
    <html><body><ul class="nav nav-list">
        <li><a href="catalogue/category/books_1/index.html">Books</a>
            <ul>
                <li><a href="catalogue/category/books/travel_2/index.html">Travel</a></li>
                <li><a href="catalogue/category/books/mystery_3/index.html">Mystery</a></li>
            </ul>
        </li>
    </ul></body></html>
"#;

/// Mounts the reference catalog: Travel (1 page, 3 items) and
/// Mystery (2 pages, 2 + 1 items)
async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROOT_HTML))
        .mount(server)
        .await;

    let travel = listing_page(
        &[
            item_block("It's Only the Himalayas", "£45.17", "Two"),
            item_block("Full Moon over Noah's Ark", "£49.43", "Four"),
            item_block("See America", "£48.87", "Three"),
        ],
        None,
    );
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/travel_2/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(travel))
        .mount(server)
        .await;

    let mystery_1 = listing_page(
        &[
            item_block("Sharp Objects", "£47.82", "Four"),
            item_block("In a Dark, Dark Wood", "£19.63", "One"),
        ],
        Some("page-2.html"),
    );
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/mystery_3/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(mystery_1))
        .mount(server)
        .await;

    let mystery_2 = listing_page(&[item_block("The Girl on the Train", "£24.57", "Five")], None);
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/mystery_3/page-2.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(mystery_2))
        .mount(server)
        .await;
}

fn db_path(dir: &tempfile::TempDir) -> String {
    dir.path().join("test.db").to_string_lossy().to_string()
}

#[tokio::test]
async fn test_full_ingestion_stores_all_records() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let config = test_config(&format!("{}/", server.uri()), &db_path(&dir), None);
    let mut coordinator = Coordinator::new(config, false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.outcome, IngestOutcome::Completed);
    assert_eq!(summary.categories, 2);
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.inserted, 6);
    assert_eq!(summary.duplicates, 0);
    assert_eq!(summary.total_count, 6);

    let store = coordinator.store();
    assert_eq!(store.list_by_category("Travel").unwrap().len(), 3);
    assert_eq!(store.list_by_category("Mystery").unwrap().len(), 3);

    let sharp = &store.find_by_title("Sharp Objects").unwrap()[0];
    assert_eq!(sharp.category, "Mystery");
    assert_eq!(sharp.price, 47.82);
    assert_eq!(sharp.rating, 4);
    assert!(sharp.image.starts_with(&server.uri()));
    assert!(sharp.image.ends_with("/media/cache/Sharp Objects.jpg"));
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);

    let config = test_config(&format!("{}/", server.uri()), &db, None);

    let mut first = Coordinator::new(config.clone(), false).unwrap();
    let summary = first.run().await.unwrap();
    assert_eq!(summary.inserted, 6);
    drop(first);

    let mut second = Coordinator::new(config, false).unwrap();
    let summary = second.run().await.unwrap();

    assert_eq!(summary.outcome, IngestOutcome::Completed);
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.duplicates, 6);
    assert_eq!(summary.total_count, 6);
}

#[tokio::test]
async fn test_target_count_is_exact() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = tempfile::tempdir().unwrap();

    // 6 items available, target 4: traversal must stop mid-category
    let config = test_config(&format!("{}/", server.uri()), &db_path(&dir), Some(4));
    let mut coordinator = Coordinator::new(config, false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.outcome, IngestOutcome::TargetReached);
    assert_eq!(summary.total_count, 4);
    assert_eq!(coordinator.store().count().unwrap(), 4);
}

#[tokio::test]
async fn test_target_of_one_stops_after_first_record() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let config = test_config(&format!("{}/", server.uri()), &db_path(&dir), Some(1));
    let mut coordinator = Coordinator::new(config, false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.outcome, IngestOutcome::TargetReached);
    assert_eq!(summary.total_count, 1);
    // Only the first category's first page should have been fetched
    assert_eq!(summary.pages_fetched, 1);
}

#[tokio::test]
async fn test_no_categories_is_distinct_from_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><a href=\"/about\">About</a></body></html>"),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let config = test_config(&format!("{}/", server.uri()), &db_path(&dir), None);
    let mut coordinator = Coordinator::new(config, false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.outcome, IngestOutcome::NoCategories);
    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(summary.total_count, 0);
}

#[tokio::test]
async fn test_root_fetch_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let config = test_config(&format!("{}/", server.uri()), &db_path(&dir), None);
    let mut coordinator = Coordinator::new(config, false).unwrap();
    let err = coordinator.run().await.unwrap_err();

    assert!(err.is_fetch());
    let run = coordinator.store().get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
}

#[tokio::test]
async fn test_category_page_fetch_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROOT_HTML))
        .mount(&server)
        .await;
    // Category pages are not mounted: every listing fetch 404s

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&format!("{}/", server.uri()), &db_path(&dir), None);
    let mut coordinator = Coordinator::new(config, false).unwrap();
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(err, IngestError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_malformed_page_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROOT_HTML))
        .mount(&server)
        .await;

    let bad_page = listing_page(&[item_block("Broken", "no-price-here", "Two")], None);
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/travel_2/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(bad_page))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&format!("{}/", server.uri()), &db_path(&dir), None);
    let mut coordinator = Coordinator::new(config, false).unwrap();
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(err, IngestError::Parse { .. }));
}

#[tokio::test]
async fn test_page_cap_guards_against_pagination_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROOT_HTML))
        .mount(&server)
        .await;

    // Every listing page claims another page follows, forever
    let looping = listing_page(&[item_block("Same Book", "£10.00", "One")], Some("page-2.html"));
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(looping))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&format!("{}/", server.uri()), &db_path(&dir), None);
    config.crawler.max_pages_per_category = 3;

    let mut coordinator = Coordinator::new(config, false).unwrap();
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(err, IngestError::PageCapExceeded { cap: 3, .. }));
}

#[tokio::test]
async fn test_pre_cancelled_run_does_no_work() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let config = test_config(&format!("{}/", server.uri()), &db_path(&dir), None);
    let cancel = CancelFlag::new();
    cancel.cancel();

    let mut coordinator =
        Coordinator::with_options(config, false, "test-hash", cancel).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.outcome, IngestOutcome::Cancelled);
    assert_eq!(summary.inserted, 0);
}

#[tokio::test]
async fn test_fresh_run_clears_previous_records() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);

    let config = test_config(&format!("{}/", server.uri()), &db, None);
    let mut first = Coordinator::new(config.clone(), false).unwrap();
    first.run().await.unwrap();
    drop(first);

    let mut second = Coordinator::new(config, true).unwrap();
    let summary = second.run().await.unwrap();

    // Everything was re-inserted from scratch, no duplicates
    assert_eq!(summary.inserted, 6);
    assert_eq!(summary.duplicates, 0);
    assert_eq!(summary.total_count, 6);
}
