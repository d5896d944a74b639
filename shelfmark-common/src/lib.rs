//! # Shelfmark Common Library
//!
//! Shared code for the Shelfmark services including:
//! - Database schema and initialization
//! - Shared data models (users, books, labels, reading status)
//! - ISBN validation
//! - Configuration loading
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod isbn;

pub use error::{Error, Result};
