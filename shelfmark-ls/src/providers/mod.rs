//! Book metadata providers
//!
//! Each provider queries one external catalog by ISBN and normalizes the
//! response into a [`BookMetadata`](shelfmark_common::db::models::BookMetadata)
//! record. Normalization happens here and nowhere else: every field is
//! defaulted before a record leaves this module, so store and API layers
//! never see missing data.

pub mod google_books;
pub mod open_library;

pub use google_books::GoogleBooksClient;
pub use open_library::OpenLibraryClient;

use shelfmark_common::db::models::BookMetadata;
use thiserror::Error;

/// Fallback title when a catalog record has none
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Fallback author when a catalog record has none
pub const UNKNOWN_AUTHOR: &str = "Unknown";
/// Fallback publisher when a catalog record has none
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";
/// Fallback publication date when a catalog record has none
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// Provider transport and decoding errors.
///
/// A catalog that has no record for an ISBN is not an error; lookups
/// report that as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A queryable book metadata catalog.
///
/// # Example
/// ```rust,ignore
/// use shelfmark_ls::providers::{MetadataSource, SourceError};
/// use shelfmark_common::db::models::BookMetadata;
///
/// pub struct StaticSource;
///
/// #[async_trait::async_trait]
/// impl MetadataSource for StaticSource {
///     fn name(&self) -> &'static str { "static" }
///
///     async fn lookup_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>, SourceError> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Provider name for logging and provenance
    fn name(&self) -> &'static str;

    /// Query the catalog for one ISBN.
    ///
    /// Returns `Ok(Some)` with a fully normalized record, `Ok(None)` when
    /// the catalog has no entry for the ISBN, and `Err` only for transport
    /// or decoding failures.
    async fn lookup_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>, SourceError>;
}
