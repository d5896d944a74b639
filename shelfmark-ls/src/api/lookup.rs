//! ISBN metadata lookup endpoint
//!
//! Thin HTTP wrapper around the resolver: the normalized record comes
//! back as-is, and the resolution error taxonomy maps onto status codes
//! (invalid ISBN 400, no match 404, provider failure 502).

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use shelfmark_common::db::models::BookMetadata;

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/lookup/:isbn
pub async fn lookup_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> ApiResult<Json<BookMetadata>> {
    let metadata = state.resolver.resolve(&isbn).await?;
    Ok(Json(metadata))
}

/// Build lookup routes
pub fn lookup_routes() -> Router<AppState> {
    Router::new().route("/api/lookup/:isbn", get(lookup_isbn))
}
