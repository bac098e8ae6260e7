//! Listing-page extraction
//!
//! Parses one category listing page into normalized item records plus the
//! next-page link, if any. Each repeating `article.product_pod` block yields
//! one record; any malformed block fails the whole page (the source markup
//! is machine-generated, so a bad block means the page shape changed and
//! partial output would be misleading).
//!
//! Two base URLs matter here and they are not interchangeable: image paths
//! resolve against the catalog root, because the source emits image links
//! relative to it, while the next-page link resolves against the current
//! page URL, because pagination files are siblings of the page itself.

use crate::crawler::fetcher::{fetch_page, RetryPolicy};
use crate::storage::ItemRecord;
use crate::{IngestError, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One parsed listing page
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// Records extracted from this page, in document order
    pub records: Vec<ItemRecord>,
    /// Absolute URL of the next listing page, when a "next" control exists
    pub next_page: Option<Url>,
}

fn selector(s: &'static str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| IngestError::Parse {
        url: String::new(),
        message: format!("bad selector '{}': {}", s, e),
    })
}

fn parse_error(page_url: &Url, message: impl Into<String>) -> IngestError {
    IngestError::Parse {
        url: page_url.to_string(),
        message: message.into(),
    }
}

/// Maps a textual rating token ("one".."five", any case) to its integer value
pub fn rating_from_word(word: &str) -> Option<u32> {
    match word.to_ascii_lowercase().as_str() {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        _ => None,
    }
}

/// Parses a currency-prefixed price string into a non-negative decimal
///
/// Strips the pound glyph, including the `Â£` mojibake the source serves
/// when its Latin-1 bytes are read as UTF-8.
pub fn parse_price(text: &str) -> std::result::Result<f64, String> {
    let trimmed = text.trim();
    let numeric = trimmed
        .strip_prefix("Â£")
        .or_else(|| trimmed.strip_prefix('£'))
        .unwrap_or(trimmed);

    let value: f64 = numeric
        .parse()
        .map_err(|_| format!("non-numeric price '{}'", text))?;

    if value < 0.0 {
        return Err(format!("negative price '{}'", text));
    }

    Ok(value)
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses one listing page into records and the next-page link
///
/// # Arguments
///
/// * `html` - The page markup
/// * `page_url` - URL this page was fetched from; base for the next-page link
/// * `root_url` - Catalog root URL; base for image links
/// * `category` - Owning category name, copied onto every record
pub fn parse_listing(
    html: &str,
    page_url: &Url,
    root_url: &Url,
    category: &str,
) -> Result<ListingPage> {
    let document = Html::parse_document(html);

    let item_selector = selector("article.product_pod")?;
    let title_selector = selector("h3 a")?;
    let price_selector = selector("p.price_color")?;
    let rating_selector = selector("p.star-rating")?;
    let availability_selector = selector("p.availability")?;
    let image_selector = selector("img")?;
    let next_selector = selector("li.next a")?;

    let mut records = Vec::new();

    for item in document.select(&item_selector) {
        let title = item
            .select(&title_selector)
            .next()
            .and_then(|a| a.value().attr("title"))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| parse_error(page_url, "item block missing title"))?
            .to_string();

        let price_text = item
            .select(&price_selector)
            .next()
            .map(collapsed_text)
            .ok_or_else(|| {
                parse_error(page_url, format!("item '{}' missing price", title))
            })?;
        let price = parse_price(&price_text)
            .map_err(|msg| parse_error(page_url, format!("item '{}': {}", title, msg)))?;

        // The rating is spelled out as the second CSS class of the rating
        // element, e.g. class="star-rating Three".
        let rating_word = item
            .select(&rating_selector)
            .next()
            .and_then(|p| p.value().classes().find(|c| *c != "star-rating"))
            .ok_or_else(|| {
                parse_error(page_url, format!("item '{}' missing rating class", title))
            })?;
        let rating = rating_from_word(rating_word).ok_or_else(|| {
            parse_error(
                page_url,
                format!("item '{}': unrecognized rating token '{}'", title, rating_word),
            )
        })?;

        let availability = item
            .select(&availability_selector)
            .next()
            .map(collapsed_text)
            .ok_or_else(|| {
                parse_error(page_url, format!("item '{}' missing availability", title))
            })?;

        let image_path = item
            .select(&image_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .ok_or_else(|| {
                parse_error(page_url, format!("item '{}' missing image", title))
            })?;
        let image = root_url
            .join(image_path)
            .map_err(|e| {
                parse_error(page_url, format!("item '{}': bad image path: {}", title, e))
            })?
            .to_string();

        records.push(ItemRecord {
            title,
            price,
            rating,
            availability,
            category: category.to_string(),
            image,
        });
    }

    let next_page = match document
        .select(&next_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
    {
        Some(href) => Some(page_url.join(href).map_err(|e| {
            parse_error(page_url, format!("bad next-page link '{}': {}", href, e))
        })?),
        None => None,
    };

    Ok(ListingPage { records, next_page })
}

/// Fetches one listing page and extracts its records
pub async fn extract_page(
    client: &Client,
    page_url: &Url,
    root_url: &Url,
    category: &str,
    retry: RetryPolicy,
) -> Result<ListingPage> {
    let html = fetch_page(client, page_url, retry).await?;
    parse_listing(&html, page_url, root_url, category)
}
