//! Google Books API client
//!
//! Preferred metadata provider. Queries the volumes endpoint by ISBN and
//! normalizes the first matching volume.

use super::{
    MetadataSource, SourceError, UNKNOWN_AUTHOR, UNKNOWN_DATE, UNKNOWN_PUBLISHER, UNKNOWN_TITLE,
};
use serde::Deserialize;
use shelfmark_common::db::models::BookMetadata;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const USER_AGENT: &str = "shelfmark/0.1.0 (https://github.com/shelfmark/shelfmark)";
const RATE_LIMIT_MS: u64 = 500; // courtesy limit, 2 requests per second

/// Volumes search response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct VolumesResponse {
    #[serde(rename = "totalItems", default)]
    pub total_items: i64,
    pub items: Option<Vec<VolumeItem>>,
}

/// One volume in the search response
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeItem {
    #[serde(rename = "volumeInfo")]
    pub volume_info: Option<VolumeInfo>,
    #[serde(rename = "saleInfo")]
    pub sale_info: Option<SaleInfo>,
}

/// Bibliographic fields of a volume
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "imageLinks")]
    pub image_links: Option<ImageLinks>,
}

/// Cover image links of a volume
#[derive(Debug, Clone, Deserialize)]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
}

/// Sale information of a volume
#[derive(Debug, Clone, Deserialize)]
pub struct SaleInfo {
    #[serde(rename = "listPrice")]
    pub list_price: Option<ListPrice>,
}

/// List price inside the sale information
#[derive(Debug, Clone, Deserialize)]
pub struct ListPrice {
    pub amount: Option<f64>,
}

/// Rate limiter spacing outbound requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Google Books API client
pub struct GoogleBooksClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
}

impl GoogleBooksClient {
    pub fn new() -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
        })
    }
}

#[async_trait::async_trait]
impl MetadataSource for GoogleBooksClient {
    fn name(&self) -> &'static str {
        "google-books"
    }

    async fn lookup_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>, SourceError> {
        self.rate_limiter.wait().await;

        let url = format!("{}?q=isbn:{}", GOOGLE_BOOKS_BASE_URL, isbn);

        tracing::debug!(isbn = %isbn, url = %url, "Querying Google Books API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), error_text));
        }

        let volumes: VolumesResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        match extract_metadata(isbn, volumes) {
            Some(metadata) => {
                tracing::info!(
                    isbn = %isbn,
                    title = %metadata.title,
                    "Retrieved book from Google Books"
                );
                Ok(Some(metadata))
            }
            None => {
                tracing::debug!(isbn = %isbn, "Google Books has no record for ISBN");
                Ok(None)
            }
        }
    }
}

/// Normalize a volumes response into a book record.
///
/// Returns `None` when the response carries no usable volume: zero total
/// items, an empty item list, or a first item without bibliographic info.
/// Only the first volume is ever considered.
fn extract_metadata(isbn: &str, volumes: VolumesResponse) -> Option<BookMetadata> {
    if volumes.total_items <= 0 {
        return None;
    }

    let mut items = volumes.items?;
    if items.is_empty() {
        return None;
    }
    let item = items.remove(0);

    let info = item.volume_info?;

    let title = info.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let author = match info.authors {
        Some(authors) if !authors.is_empty() => authors.join(", "),
        _ => UNKNOWN_AUTHOR.to_string(),
    };

    let publisher = info
        .publisher
        .unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string());

    let published = info
        .published_date
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());

    let description = info.description.unwrap_or_default();

    // Thumbnails are served over plain HTTP; rewrite to HTTPS
    let cover_url = info
        .image_links
        .and_then(|links| links.thumbnail)
        .map(|url| url.replace("http://", "https://"))
        .unwrap_or_default();

    let price = item
        .sale_info
        .and_then(|sale| sale.list_price)
        .and_then(|list| list.amount)
        .unwrap_or(0.0);

    Some(BookMetadata {
        isbn: isbn.to_string(),
        title,
        author,
        publisher,
        published,
        // This catalog does not expose a publication place
        publish_place: String::new(),
        price,
        cover_url,
        description,
    })
}
