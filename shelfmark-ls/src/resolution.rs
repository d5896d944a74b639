//! ISBN metadata resolution with provider failover
//!
//! Queries the preferred catalog first and falls back to the secondary one.
//! Each provider is queried at most once per resolution; there are no
//! retries. Fallback data masks a primary failure, a double failure
//! surfaces the primary's original error, and a double miss reports that
//! no catalog knows the ISBN.

use crate::providers::{GoogleBooksClient, MetadataSource, OpenLibraryClient, SourceError};
use shelfmark_common::db::models::BookMetadata;
use shelfmark_common::isbn::is_valid_isbn13;
use thiserror::Error;
use tracing::{debug, warn};

/// Resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Input failed ISBN-13 validation; no provider was queried
    #[error("Invalid ISBN format: {0}")]
    InvalidIsbn(String),

    /// Every provider answered, none had a record
    #[error("No book information found for ISBN {0}")]
    NoMatch(String),

    /// Provider failure that could not be recovered by falling back
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Which provider a resolution attempt is on
enum Attempt {
    Primary,
    /// Carries the primary's failure so a failed fallback can surface it
    Fallback { primary_failure: Option<SourceError> },
}

/// Metadata resolver over an ordered provider pair
pub struct Resolver {
    primary: Box<dyn MetadataSource>,
    fallback: Box<dyn MetadataSource>,
}

impl Resolver {
    pub fn new(primary: Box<dyn MetadataSource>, fallback: Box<dyn MetadataSource>) -> Self {
        Self { primary, fallback }
    }

    /// Resolver over the production provider pair, Google Books preferred
    /// and Open Library as fallback
    pub fn with_default_sources() -> Result<Self, SourceError> {
        Ok(Self::new(
            Box::new(GoogleBooksClient::new()?),
            Box::new(OpenLibraryClient::new()?),
        ))
    }

    /// Resolve one ISBN to a normalized book record.
    ///
    /// The ISBN is validated before any provider call. Providers are
    /// queried strictly in order, never concurrently.
    pub async fn resolve(&self, isbn: &str) -> Result<BookMetadata, ResolveError> {
        if !is_valid_isbn13(isbn) {
            return Err(ResolveError::InvalidIsbn(isbn.to_string()));
        }

        let mut attempt = Attempt::Primary;

        loop {
            match attempt {
                Attempt::Primary => {
                    debug!(isbn = %isbn, provider = %self.primary.name(), "Resolving ISBN");
                    match self.primary.lookup_isbn(isbn).await {
                        Ok(Some(metadata)) => return Ok(metadata),
                        Ok(None) => {
                            attempt = Attempt::Fallback {
                                primary_failure: None,
                            };
                        }
                        Err(e) => {
                            warn!(
                                isbn = %isbn,
                                provider = %self.primary.name(),
                                error = %e,
                                "Primary provider failed, trying fallback"
                            );
                            attempt = Attempt::Fallback {
                                primary_failure: Some(e),
                            };
                        }
                    }
                }
                Attempt::Fallback { primary_failure } => {
                    debug!(isbn = %isbn, provider = %self.fallback.name(), "Resolving ISBN");
                    match self.fallback.lookup_isbn(isbn).await {
                        Ok(Some(metadata)) => {
                            if primary_failure.is_some() {
                                warn!(
                                    isbn = %isbn,
                                    provider = %self.fallback.name(),
                                    "Fallback provider recovered a failed resolution"
                                );
                            }
                            return Ok(metadata);
                        }
                        // A miss on both providers is a miss even when the
                        // primary failed outright
                        Ok(None) => return Err(ResolveError::NoMatch(isbn.to_string())),
                        Err(fallback_failure) => {
                            // Surface the primary's original error when both failed
                            let failure = primary_failure.unwrap_or(fallback_failure);
                            return Err(ResolveError::Source(failure));
                        }
                    }
                }
            }
        }
    }
}
