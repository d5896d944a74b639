//! Open Library API client
//!
//! Fallback metadata provider. Queries the books endpoint by ISBN bibkey
//! and normalizes the keyed record.

use super::{
    MetadataSource, SourceError, UNKNOWN_AUTHOR, UNKNOWN_DATE, UNKNOWN_PUBLISHER, UNKNOWN_TITLE,
};
use serde::Deserialize;
use shelfmark_common::db::models::BookMetadata;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const OPEN_LIBRARY_BASE_URL: &str = "https://openlibrary.org/api/books";
const USER_AGENT: &str = "shelfmark/0.1.0 (https://github.com/shelfmark/shelfmark)";
const RATE_LIMIT_MS: u64 = 1000; // 1 request per second per Open Library guidance

/// One record of the books response, keyed by `ISBN:<isbn>` in the envelope
#[derive(Debug, Clone, Deserialize)]
pub struct OpenLibraryRecord {
    pub title: Option<String>,
    pub authors: Option<Vec<NamedEntry>>,
    pub publishers: Option<Vec<NamedEntry>>,
    pub publish_date: Option<String>,
    pub publish_places: Option<Vec<NamedEntry>>,
    pub description: Option<Description>,
    pub cover: Option<Cover>,
}

/// List entry carrying a display name (authors, publishers, places)
#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntry {
    pub name: Option<String>,
}

/// Description field, served either as a bare string or a typed text object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Object { value: String },
}

impl Description {
    fn into_string(self) -> String {
        match self {
            Description::Text(s) => s,
            Description::Object { value } => value,
        }
    }
}

/// Cover image URLs by size
#[derive(Debug, Clone, Deserialize)]
pub struct Cover {
    pub medium: Option<String>,
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

/// Open Library API client
pub struct OpenLibraryClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
}

impl OpenLibraryClient {
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
impl MetadataSource for OpenLibraryClient {
    fn name(&self) -> &'static str {
        "open-library"
    }

    async fn lookup_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>, SourceError> {
        self.rate_limiter.wait().await;

        let url = format!(
            "{}?bibkeys=ISBN:{}&format=json&jscmd=data",
            OPEN_LIBRARY_BASE_URL, isbn
        );

        tracing::debug!(isbn = %isbn, url = %url, "Querying Open Library API");

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

        let mut records: HashMap<String, OpenLibraryRecord> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        match records.remove(&format!("ISBN:{}", isbn)) {
            Some(record) => {
                let metadata = normalize_record(isbn, record);
                tracing::info!(
                    isbn = %isbn,
                    title = %metadata.title,
                    "Retrieved book from Open Library"
                );
                Ok(Some(metadata))
            }
            None => {
                tracing::debug!(isbn = %isbn, "Open Library has no record for ISBN");
                Ok(None)
            }
        }
    }
}

/// Normalize a keyed record into a book record. Every field is defaulted.
fn normalize_record(isbn: &str, record: OpenLibraryRecord) -> BookMetadata {
    let title = record.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let author_names: Vec<String> = record
        .authors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| entry.name)
        .collect();
    let author = if author_names.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        author_names.join(", ")
    };

    // Only the first listed publisher is used
    let publisher = record
        .publishers
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|entry| entry.name)
        .unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string());

    let published = record
        .publish_date
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());

    let publish_place = record
        .publish_places
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|entry| entry.name)
        .unwrap_or_default();

    let description = record
        .description
        .map(Description::into_string)
        .unwrap_or_default();

    let cover_url = record
        .cover
        .and_then(|cover| cover.medium)
        .unwrap_or_default();

    BookMetadata {
        isbn: isbn.to_string(),
        title,
        author,
        publisher,
        published,
        publish_place,
        // This catalog does not carry price data
        price: 0.0,
        cover_url,
        description,
    }
}
