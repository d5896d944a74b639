//! User account store operations

use shelfmark_common::db::init::SYSTEM_USER_ID;
use shelfmark_common::db::models::{NewUser, User};
use shelfmark_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        account: row.get("account"),
        password: row.get("password"),
        display_name: row.get("display_name"),
        avatar: row.get("avatar"),
    }
}

/// Create a user account and return its id.
///
/// Account names are unique; a duplicate reports `ConstraintViolation`.
pub async fn add_user(pool: &SqlitePool, user: &NewUser) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (account, password, display_name, avatar)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&user.account)
    .bind(&user.password)
    .bind(&user.display_name)
    .bind(&user.avatar)
    .execute(pool)
    .await
    .map_err(|e| Error::from_write(e, "users.account"))?;

    let id = result.last_insert_rowid();
    info!(user_id = id, account = %user.account, "Created user account");

    Ok(id)
}

/// Load a user by id
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, account, password, display_name, avatar FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(user_from_row))
}

/// Load a user by account name.
///
/// The reserved system user is not addressable this way.
pub async fn get_user_by_account(pool: &SqlitePool, account: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, account, password, display_name, avatar FROM users WHERE account = ? AND id != ?",
    )
    .bind(account)
    .bind(SYSTEM_USER_ID)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(user_from_row))
}

/// Update a user's profile fields.
///
/// Reports `NotFound` when no row has the id and `ConstraintViolation`
/// when the new account name is already taken.
pub async fn update_user(pool: &SqlitePool, user: &User) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET account = ?, password = ?, display_name = ?, avatar = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&user.account)
    .bind(&user.password)
    .bind(&user.display_name)
    .bind(&user.avatar)
    .bind(user.id)
    .execute(pool)
    .await
    .map_err(|e| Error::from_write(e, "users.account"))?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User {} does not exist", user.id)));
    }

    Ok(())
}

/// Delete a user account and everything hanging off it.
///
/// One transaction deletes, in order, the user's label associations, the
/// personalized labels the user owns, the ownership rows, the reading
/// statuses, and finally the user row. Canonical book rows and system
/// labels survive. Any failure rolls the whole deletion back.
pub async fn delete_user_and_related_data(pool: &SqlitePool, user_id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM book_labels WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    // Cascade on book_labels.label_id clears any remaining associations
    // to these labels
    sqlx::query("DELETE FROM labels WHERE owner_id = ? AND personalized = 1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM user_books WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM reading_status WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User {} does not exist", user_id)));
    }

    tx.commit()
        .await
        .map_err(|e| Error::TransactionFailed(e.to_string()))?;

    info!(user_id, "Deleted user account and related data");

    Ok(())
}
