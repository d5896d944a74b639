//! Book store operations
//!
//! Books are canonical shared rows keyed by unique ISBN. Per-user state
//! (ownership, labels, reading status) lives in the link tables.

use shelfmark_common::db::models::{Book, BookMetadata, ReadingStatus};
use shelfmark_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

/// Number of books a similarity query returns at most
pub const SIMILAR_BOOKS_LIMIT: i64 = 5;

const BOOK_COLUMNS: &str = "id, isbn, title, author, publisher, published, \
     publish_place, price, cover_url, description";

fn book_from_row(row: &SqliteRow) -> Book {
    Book {
        id: row.get("id"),
        isbn: row.get("isbn"),
        title: row.get("title"),
        author: row.get("author"),
        publisher: row.get("publisher"),
        published: row.get("published"),
        publish_place: row.get("publish_place"),
        price: row.get("price"),
        cover_url: row.get("cover_url"),
        description: row.get("description"),
    }
}

/// Add a resolved book to a user's shelf.
///
/// One transaction covers the whole operation: the canonical book row is
/// inserted if no row with the ISBN exists yet, the ownership row is
/// upserted, and a fresh book row gets its default to-read status for the
/// adding user. A failure anywhere leaves nothing behind.
///
/// Returns the canonical book id. Re-adding an owned book is a no-op that
/// still returns the id.
pub async fn add_book_for_user(
    pool: &SqlitePool,
    user_id: i64,
    metadata: &BookMetadata,
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE isbn = ?")
        .bind(&metadata.isbn)
        .fetch_optional(&mut *tx)
        .await?;

    let (book_id, newly_inserted) = match existing {
        Some(id) => (id, false),
        None => {
            let result = sqlx::query(
                r#"
                INSERT INTO books (isbn, title, author, publisher, published,
                                   publish_place, price, cover_url, description)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&metadata.isbn)
            .bind(&metadata.title)
            .bind(&metadata.author)
            .bind(&metadata.publisher)
            .bind(&metadata.published)
            .bind(&metadata.publish_place)
            .bind(metadata.price)
            .bind(&metadata.cover_url)
            .bind(&metadata.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::from_write(e, "books.isbn"))?;

            (result.last_insert_rowid(), true)
        }
    };

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO user_books (user_id, book_id)
        VALUES (?, ?)
        "#,
    )
    .bind(user_id)
    .bind(book_id)
    .execute(&mut *tx)
    .await?;

    if newly_inserted {
        sqlx::query(
            r#"
            INSERT INTO reading_status (book_id, user_id, status)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(ReadingStatus::ToRead.as_str())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit()
        .await
        .map_err(|e| Error::TransactionFailed(e.to_string()))?;

    if newly_inserted {
        info!(book_id, isbn = %metadata.isbn, user_id, "Added new book");
    } else {
        debug!(book_id, isbn = %metadata.isbn, user_id, "Book already known, ensured ownership");
    }

    Ok(book_id)
}

/// Load a book by id
pub async fn get_book(pool: &SqlitePool, id: i64) -> Result<Option<Book>> {
    let row = sqlx::query(&format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(book_from_row))
}

/// All books on a user's shelf, oldest first
pub async fn get_user_books(pool: &SqlitePool, user_id: i64) -> Result<Vec<Book>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM books b
        JOIN user_books ub ON ub.book_id = b.id
        WHERE ub.user_id = ?
        ORDER BY b.id
        "#,
        BOOK_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(book_from_row).collect())
}

/// Look up a book on a user's shelf by ISBN.
///
/// Scoped to ownership: a book known to the store but not owned by this
/// user reads as absent.
pub async fn get_book_by_isbn(
    pool: &SqlitePool,
    isbn: &str,
    user_id: i64,
) -> Result<Option<Book>> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {} FROM books b
        JOIN user_books ub ON ub.book_id = b.id
        WHERE b.isbn = ? AND ub.user_id = ?
        "#,
        BOOK_COLUMNS
    ))
    .bind(isbn)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(book_from_row))
}

/// Remove a book from a user's shelf.
///
/// One transaction deletes the ownership row, the user's reading status,
/// and the user's label associations for the book. The canonical book row
/// stays; other users are untouched. Reports `NotFound` when the user did
/// not own the book.
pub async fn remove_book_from_user(pool: &SqlitePool, user_id: i64, book_id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM user_books WHERE user_id = ? AND book_id = ?")
        .bind(user_id)
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "Book {} is not on user {}'s shelf",
            book_id, user_id
        )));
    }

    sqlx::query("DELETE FROM reading_status WHERE user_id = ? AND book_id = ?")
        .bind(user_id)
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM book_labels WHERE user_id = ? AND book_id = ?")
        .bind(user_id)
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

    tx.commit()
        .await
        .map_err(|e| Error::TransactionFailed(e.to_string()))?;

    info!(book_id, user_id, "Removed book from shelf");

    Ok(())
}

/// Books sharing at least one label with the given book.
///
/// Labels are read from the querying user's associations; candidate books
/// come from every user's associations, so one reader's shelf can surface
/// another reader's finds. The queried book itself is excluded and the
/// result is capped at [`SIMILAR_BOOKS_LIMIT`]. A book with no labels has
/// no similar books.
pub async fn find_similar_by_labels(
    pool: &SqlitePool,
    book_id: i64,
    user_id: i64,
) -> Result<Vec<Book>> {
    let label_ids: Vec<i64> =
        sqlx::query_scalar("SELECT label_id FROM book_labels WHERE book_id = ? AND user_id = ?")
            .bind(book_id)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    if label_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; label_ids.len()].join(", ");
    let sql = format!(
        r#"
        SELECT DISTINCT {} FROM books b
        JOIN book_labels bl ON bl.book_id = b.id
        WHERE bl.label_id IN ({}) AND b.id != ?
        LIMIT {}
        "#,
        BOOK_COLUMNS, placeholders, SIMILAR_BOOKS_LIMIT
    );

    let mut query = sqlx::query(&sql);
    for label_id in &label_ids {
        query = query.bind(label_id);
    }
    query = query.bind(book_id);

    let rows = query.fetch_all(pool).await?;

    Ok(rows.iter().map(book_from_row).collect())
}

/// Books on a user's shelf carrying the given label
pub async fn get_books_with_label(
    pool: &SqlitePool,
    label_id: i64,
    user_id: i64,
) -> Result<Vec<Book>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM books b
        JOIN book_labels bl ON bl.book_id = b.id
        WHERE bl.label_id = ? AND bl.user_id = ?
        "#,
        BOOK_COLUMNS
    ))
    .bind(label_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(book_from_row).collect())
}

/// Books on a user's shelf with the given reading status.
///
/// Joins through ownership so a status row orphaned by external edits
/// cannot surface a book that is no longer on the shelf.
pub async fn get_books_with_status(
    pool: &SqlitePool,
    user_id: i64,
    status: ReadingStatus,
) -> Result<Vec<Book>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM books b
        JOIN user_books ub ON ub.book_id = b.id
        JOIN reading_status rs ON rs.book_id = b.id AND rs.user_id = ub.user_id
        WHERE rs.user_id = ? AND rs.status = ?
        "#,
        BOOK_COLUMNS
    ))
    .bind(user_id)
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(book_from_row).collect())
}
