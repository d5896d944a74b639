//! Label store operations
//!
//! Two kinds of label share one table: system labels (seeded, owned by
//! the reserved system user, visible to everyone) and personalized labels
//! (owned by one user, visible only to them). Book associations are
//! per-user triples, so two readers can label the same book differently.

use shelfmark_common::db::init::SYSTEM_USER_ID;
use shelfmark_common::db::models::Label;
use shelfmark_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

fn label_from_row(row: &SqliteRow) -> Label {
    Label {
        id: row.get("id"),
        name: row.get("name"),
        personalized: row.get::<i64, _>("personalized") != 0,
        owner_id: row.get("owner_id"),
    }
}

/// Insert a label and return its id.
///
/// System labels (`personalized = false`) belong to the reserved system
/// user regardless of the caller.
pub async fn insert_label(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
    personalized: bool,
) -> Result<i64> {
    let owner_id = if personalized { user_id } else { SYSTEM_USER_ID };

    let result = sqlx::query(
        r#"
        INSERT INTO labels (name, personalized, owner_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(personalized)
    .bind(owner_id)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    info!(label_id = id, name = %name, personalized, "Created label");

    Ok(id)
}

/// All system labels, in seed order
pub async fn get_system_labels(pool: &SqlitePool) -> Result<Vec<Label>> {
    let rows = sqlx::query(
        "SELECT id, name, personalized, owner_id FROM labels WHERE personalized = 0 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(label_from_row).collect())
}

/// The personalized labels one user owns
pub async fn get_user_labels(pool: &SqlitePool, user_id: i64) -> Result<Vec<Label>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, personalized, owner_id FROM labels
        WHERE owner_id = ? AND personalized = 1
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(label_from_row).collect())
}

/// Every label a user can attach: system labels plus their own
pub async fn get_all_available_labels(pool: &SqlitePool, user_id: i64) -> Result<Vec<Label>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, personalized, owner_id FROM labels
        WHERE personalized = 0 OR (personalized = 1 AND owner_id = ?)
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(label_from_row).collect())
}

/// Exact-name lookup among the labels a user can see.
///
/// Name uniqueness is enforced per visibility scope, not globally: the
/// service reuses the label this returns instead of creating a duplicate,
/// while two different users can each own a label with the same name.
pub async fn get_visible_label_by_name(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
) -> Result<Option<Label>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, personalized, owner_id FROM labels
        WHERE name = ? AND (personalized = 0 OR (personalized = 1 AND owner_id = ?))
        ORDER BY personalized
        LIMIT 1
        "#,
    )
    .bind(name)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(label_from_row))
}

/// Attach a label to a book for one user. Idempotent.
///
/// An id that matches no book, label, or user reports
/// `ConstraintViolation` rather than a bare database error.
pub async fn add_label_to_book(
    pool: &SqlitePool,
    book_id: i64,
    label_id: i64,
    user_id: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO book_labels (book_id, label_id, user_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(book_id)
    .bind(label_id)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| Error::from_write(e, "book_labels"))?;

    Ok(())
}

/// Detach a label from a book for one user.
///
/// Removing an association that does not exist is a no-op.
pub async fn remove_label_from_book(
    pool: &SqlitePool,
    book_id: i64,
    label_id: i64,
    user_id: i64,
) -> Result<()> {
    sqlx::query("DELETE FROM book_labels WHERE book_id = ? AND label_id = ? AND user_id = ?")
        .bind(book_id)
        .bind(label_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Labels one user attached to one book
pub async fn get_book_labels(pool: &SqlitePool, book_id: i64, user_id: i64) -> Result<Vec<Label>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, personalized, owner_id FROM labels l
        JOIN book_labels bl ON bl.label_id = l.id
        WHERE bl.book_id = ? AND bl.user_id = ?
        ORDER BY l.id
        "#,
    )
    .bind(book_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(label_from_row).collect())
}

/// Rename a personalized label.
///
/// Only the owner can rename, and system labels never change. Reports
/// `NotFound` when no owned personalized label has the id.
pub async fn update_label_name(
    pool: &SqlitePool,
    label_id: i64,
    user_id: i64,
    new_name: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE labels
        SET name = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ? AND owner_id = ? AND personalized = 1
        "#,
    )
    .bind(new_name)
    .bind(label_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "No personalized label {} owned by user {}",
            label_id, user_id
        )));
    }

    Ok(())
}

/// Delete a personalized label.
///
/// Associations disappear with it through the foreign key cascade. Only
/// the owner can delete, and system labels never go away.
pub async fn delete_label(pool: &SqlitePool, label_id: i64, user_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM labels WHERE id = ? AND owner_id = ? AND personalized = 1")
        .bind(label_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "No personalized label {} owned by user {}",
            label_id, user_id
        )));
    }

    info!(label_id, user_id, "Deleted label");

    Ok(())
}

/// Remove one user's associations to a label across all books
pub async fn remove_all_book_label_associations(
    pool: &SqlitePool,
    label_id: i64,
    user_id: i64,
) -> Result<()> {
    sqlx::query("DELETE FROM book_labels WHERE label_id = ? AND user_id = ?")
        .bind(label_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
