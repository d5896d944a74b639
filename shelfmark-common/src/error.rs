//! Common error types for Shelfmark

use thiserror::Error;

/// Common result type for Shelfmark operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Shelfmark services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write rejected by a uniqueness or foreign key constraint
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Multi-statement write failed to commit and was rolled back
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map a sqlx error to `ConstraintViolation` when it is a unique or
    /// foreign key constraint failure, otherwise wrap it as `Database`.
    pub fn from_write(err: sqlx::Error, context: &str) -> Self {
        match &err {
            sqlx::Error::Database(db)
                if db.is_unique_violation() || db.is_foreign_key_violation() =>
            {
                Error::ConstraintViolation(context.to_string())
            }
            _ => Error::Database(err),
        }
    }
}
