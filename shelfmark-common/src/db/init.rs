//! Database initialization
//!
//! Opens or creates the SQLite database, creates the schema idempotently,
//! and seeds the reserved system user plus the default label set. Safe to
//! call at every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Reserved user id owning the shared system labels.
///
/// Seeded at initialization so label ownership always satisfies the
/// foreign key. Never returned by account lookups and never logged in.
pub const SYSTEM_USER_ID: i64 = 0;

/// Labels every installation starts with
pub const DEFAULT_LABELS: [&str; 5] = ["novel", "short story", "essay", "poems", "play"];

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys; cascades and ownership constraints depend on it
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;
    seed_defaults(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
///
/// Exported separately so tests can build the schema on an in-memory pool.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_books_table(pool).await?;
    create_user_books_table(pool).await?;
    create_labels_table(pool).await?;
    create_book_labels_table(pool).await?;
    create_reading_status_table(pool).await?;
    Ok(())
}

/// Seed the reserved system user and the default labels (idempotent)
pub async fn seed_defaults(pool: &SqlitePool) -> Result<()> {
    seed_system_user(pool).await?;
    seed_default_labels(pool).await?;
    Ok(())
}

pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            display_name TEXT NOT NULL,
            avatar TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_books_table(pool: &SqlitePool) -> Result<()> {
    // Text columns are NOT NULL: provider normalization defaults every
    // field before a record reaches the store
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            isbn TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            publisher TEXT NOT NULL,
            published TEXT NOT NULL,
            publish_place TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL DEFAULT 0,
            cover_url TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_user_books_table(pool: &SqlitePool) -> Result<()> {
    // Book deletion cascades; user deletion cascades manually inside the
    // account deletion transaction
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_books (
            user_id INTEGER NOT NULL REFERENCES users(id),
            book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (user_id, book_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_books_book_id ON user_books(book_id)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_labels_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS labels (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            personalized INTEGER NOT NULL DEFAULT 1,
            owner_id INTEGER NOT NULL DEFAULT 0 REFERENCES users(id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_labels_owner_id ON labels(owner_id)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_book_labels_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS book_labels (
            book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (book_id, label_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_book_labels_label_id ON book_labels(label_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_book_labels_user_id ON book_labels(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_reading_status_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reading_status (
            book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id),
            status TEXT NOT NULL DEFAULT 'to_read'
                CHECK (status IN ('to_read', 'already_read')),
            finished_on TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (book_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reading_status_user_id ON reading_status(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the reserved system user if it doesn't exist
async fn seed_system_user(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (id, account, password, display_name, avatar)
        VALUES (?, 'system', '', 'System', '')
        "#,
    )
    .bind(SYSTEM_USER_ID)
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert the default label set when no system label exists yet
async fn seed_default_labels(pool: &SqlitePool) -> Result<()> {
    let system_label_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM labels WHERE personalized = 0")
            .fetch_one(pool)
            .await?;

    if system_label_count > 0 {
        return Ok(());
    }

    for name in DEFAULT_LABELS {
        sqlx::query(
            r#"
            INSERT INTO labels (name, personalized, owner_id)
            VALUES (?, 0, ?)
            "#,
        )
        .bind(name)
        .bind(SYSTEM_USER_ID)
        .execute(pool)
        .await?;
    }

    info!("Seeded {} default labels", DEFAULT_LABELS.len());

    Ok(())
}
