//! Composite library operations
//!
//! Multi-step flows built on the per-entity store modules: the two
//! add-if-not-exists entry points, label create-and-attach, reading
//! status updates with their date convention, and account deletion.

use crate::db::{books, labels, reading_status, users};
use chrono::NaiveDate;
use shelfmark_common::db::models::{BookMetadata, Label, ReadingState, ReadingStatus};
use shelfmark_common::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Library service over the shared pool
#[derive(Clone)]
pub struct LibraryService {
    pool: SqlitePool,
}

impl LibraryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a book to a user's shelf unless the shelf already has its ISBN.
    ///
    /// Checks by scanning the shelf, which keeps the semantics stable even
    /// if the metadata's ISBN matches a book owned under a different id.
    /// Returns whether anything was added.
    pub async fn add_book_if_not_exists(
        &self,
        user_id: i64,
        metadata: &BookMetadata,
    ) -> Result<bool> {
        let shelf = books::get_user_books(&self.pool, user_id).await?;

        if shelf.iter().any(|book| book.isbn == metadata.isbn) {
            debug!(user_id, isbn = %metadata.isbn, "Shelf already has ISBN, skipping add");
            return Ok(false);
        }

        books::add_book_for_user(&self.pool, user_id, metadata).await?;
        Ok(true)
    }

    /// Add a book unless owned, reporting the canonical book id either way.
    ///
    /// Callers that attach labels or set a status right after adding need
    /// the id even when the book was already on the shelf.
    pub async fn add_book_if_not_exists_with_id(
        &self,
        user_id: i64,
        metadata: &BookMetadata,
    ) -> Result<(bool, i64)> {
        if let Some(existing) =
            books::get_book_by_isbn(&self.pool, &metadata.isbn, user_id).await?
        {
            return Ok((false, existing.id));
        }

        let book_id = books::add_book_for_user(&self.pool, user_id, metadata).await?;
        Ok((true, book_id))
    }

    /// Attach a label to a book by name, creating the label if the user
    /// cannot see one with that name yet.
    ///
    /// Reuses a visible label (system, or owned by the user) with the
    /// exact name before creating. The create and attach are two separate
    /// writes: a label that was created stays even if the attach fails,
    /// matching the attach-is-idempotent model. Returns the label id.
    pub async fn create_label_and_attach(
        &self,
        name: &str,
        personalized: bool,
        user_id: i64,
        book_id: i64,
    ) -> Result<i64> {
        let label_id = match labels::get_visible_label_by_name(&self.pool, user_id, name).await? {
            Some(existing) => existing.id,
            None => labels::insert_label(&self.pool, user_id, name, personalized).await?,
        };

        labels::add_label_to_book(&self.pool, book_id, label_id, user_id).await?;

        Ok(label_id)
    }

    /// Create a personalized label for a user and return it
    pub async fn add_custom_label(&self, user_id: i64, name: &str) -> Result<Label> {
        let id = labels::insert_label(&self.pool, user_id, name, true).await?;

        Ok(Label {
            id,
            name: name.to_string(),
            personalized: true,
            owner_id: user_id,
        })
    }

    /// Set the reading status of a book for one user.
    ///
    /// Enforces the date convention: a to-read status never carries a
    /// finish date, whatever the caller passed.
    pub async fn set_reading_status(
        &self,
        book_id: i64,
        user_id: i64,
        status: ReadingStatus,
        finished_on: Option<NaiveDate>,
    ) -> Result<()> {
        let finished_on = match status {
            ReadingStatus::ToRead => None,
            ReadingStatus::AlreadyRead => finished_on,
        };

        reading_status::set_status(&self.pool, book_id, user_id, status, finished_on).await
    }

    /// Reading status of a book for one user, defaulting to to-read
    pub async fn get_reading_status(&self, book_id: i64, user_id: i64) -> Result<ReadingState> {
        reading_status::get_status(&self.pool, book_id, user_id).await
    }

    /// Delete a user account with everything hanging off it
    pub async fn delete_account(&self, user_id: i64) -> Result<()> {
        users::delete_user_and_related_data(&self.pool, user_id).await
    }
}
