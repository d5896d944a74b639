//! Reading status store operations
//!
//! One row per (book, user) pair, written through an upsert. A missing
//! row reads back as the to-read default rather than an error.

use chrono::NaiveDate;
use shelfmark_common::db::models::{ReadingState, ReadingStatus};
use shelfmark_common::Result;
use sqlx::{Row, SqlitePool};

/// Set the reading status of a book for one user.
///
/// Inserts or overwrites the single status row for the pair. The finish
/// date is stored exactly as passed; callers that want the to-read state
/// to carry no date clear it first (the service layer does).
pub async fn set_status(
    pool: &SqlitePool,
    book_id: i64,
    user_id: i64,
    status: ReadingStatus,
    finished_on: Option<NaiveDate>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reading_status (book_id, user_id, status, finished_on, updated_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT (book_id, user_id) DO UPDATE SET
            status = excluded.status,
            finished_on = excluded.finished_on,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(book_id)
    .bind(user_id)
    .bind(status.as_str())
    .bind(finished_on)
    .execute(pool)
    .await?;

    Ok(())
}

/// Read the status of a book for one user.
///
/// A pair that was never written reads as to-read with no finish date.
pub async fn get_status(pool: &SqlitePool, book_id: i64, user_id: i64) -> Result<ReadingState> {
    let row = sqlx::query(
        "SELECT status, finished_on FROM reading_status WHERE book_id = ? AND user_id = ?",
    )
    .bind(book_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let status_text: String = row.get("status");
            let status = ReadingStatus::parse(&status_text)?;
            let finished_on: Option<NaiveDate> = row.get("finished_on");

            Ok(ReadingState {
                status,
                finished_on,
            })
        }
        None => Ok(ReadingState::default()),
    }
}
