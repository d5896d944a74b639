//! shelfmark-ls library interface
//!
//! The library service: per-entity store operations, the two metadata
//! provider clients, ISBN resolution with failover, composite library
//! operations, and the HTTP API the UI and scanner collaborators call.

pub mod api;
pub mod db;
pub mod error;
pub mod library;
pub mod providers;
pub mod resolution;

pub use crate::error::{ApiError, ApiResult};
pub use crate::library::LibraryService;
pub use crate::resolution::Resolver;

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, the single store handle
    pub db: SqlitePool,
    /// ISBN metadata resolver over the provider pair
    pub resolver: Arc<Resolver>,
    /// Composite library operations over the same pool
    pub library: LibraryService,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, resolver: Arc<Resolver>) -> Self {
        let library = LibraryService::new(db.clone());
        Self {
            db,
            resolver,
            library,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::lookup_routes())
        .merge(api::user_routes())
        .merge(api::book_routes())
        .merge(api::label_routes())
        .with_state(state)
}
