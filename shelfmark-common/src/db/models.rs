//! Database models

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User account row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub account: String,
    pub password: String,
    pub display_name: String,
    pub avatar: String,
}

/// Fields for creating a user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub account: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar: String,
}

/// Canonical book row, shared across all users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published: String,
    pub publish_place: String,
    pub price: f64,
    pub cover_url: String,
    pub description: String,
}

/// Normalized book record produced by a metadata provider lookup.
///
/// Carries no row id: identity exists only once the record is stored.
/// Every field is already defaulted; consumers never re-default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published: String,
    pub publish_place: String,
    pub price: f64,
    pub cover_url: String,
    pub description: String,
}

/// Label row, either a shared system label or a user-owned one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    /// False for the built-in system labels, true for user-created ones
    pub personalized: bool,
    /// Owning user id; the reserved system user for system labels
    pub owner_id: i64,
}

/// Reading status of a book for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    ToRead,
    AlreadyRead,
}

impl ReadingStatus {
    /// TEXT encoding used in the reading_status table
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::ToRead => "to_read",
            ReadingStatus::AlreadyRead => "already_read",
        }
    }

    /// Parse the TEXT encoding back to the enum
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "to_read" => Ok(ReadingStatus::ToRead),
            "already_read" => Ok(ReadingStatus::AlreadyRead),
            other => Err(Error::InvalidInput(format!(
                "Unknown reading status: {}",
                other
            ))),
        }
    }
}

impl Default for ReadingStatus {
    fn default() -> Self {
        ReadingStatus::ToRead
    }
}

/// Reading status plus the finish date, as stored for one (book, user) pair.
///
/// A missing row reads back as the to-read default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingState {
    pub status: ReadingStatus,
    /// Set only when the status is already-read
    pub finished_on: Option<NaiveDate>,
}

impl Default for ReadingState {
    fn default() -> Self {
        ReadingState {
            status: ReadingStatus::ToRead,
            finished_on: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_status_round_trip() {
        assert_eq!(ReadingStatus::ToRead.as_str(), "to_read");
        assert_eq!(ReadingStatus::AlreadyRead.as_str(), "already_read");
        assert_eq!(
            ReadingStatus::parse("to_read").unwrap(),
            ReadingStatus::ToRead
        );
        assert_eq!(
            ReadingStatus::parse("already_read").unwrap(),
            ReadingStatus::AlreadyRead
        );
    }

    #[test]
    fn test_reading_status_rejects_unknown() {
        assert!(ReadingStatus::parse("reading").is_err());
        assert!(ReadingStatus::parse("").is_err());
    }
}
