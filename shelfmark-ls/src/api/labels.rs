//! Label management endpoints
//!
//! System labels are read-only through the API; personalized labels can
//! be created, renamed, and deleted by their owner.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use shelfmark_common::db::models::Label;

use crate::db::labels;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Label listing scope: the user's own labels, or everything they can see
#[derive(Debug, Default, Deserialize)]
pub struct LabelScopeQuery {
    pub scope: Option<String>,
}

/// New personalized label request
#[derive(Debug, Deserialize)]
pub struct CreateLabelRequest {
    pub name: String,
}

/// Label rename request
#[derive(Debug, Deserialize)]
pub struct RenameLabelRequest {
    pub name: String,
}

/// GET /api/labels/system
pub async fn get_system_labels(State(state): State<AppState>) -> ApiResult<Json<Vec<Label>>> {
    let system = labels::get_system_labels(&state.db).await?;
    Ok(Json(system))
}

/// GET /api/users/:id/labels
pub async fn get_user_labels(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<LabelScopeQuery>,
) -> ApiResult<Json<Vec<Label>>> {
    let listed = match query.scope.as_deref() {
        Some("own") => labels::get_user_labels(&state.db, user_id).await?,
        Some("all") | None => labels::get_all_available_labels(&state.db, user_id).await?,
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown label scope: {}",
                other
            )))
        }
    };

    Ok(Json(listed))
}

/// POST /api/users/:id/labels
pub async fn create_label(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<CreateLabelRequest>,
) -> ApiResult<(StatusCode, Json<Label>)> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Label name is required".to_string()));
    }

    let label = state.library.add_custom_label(user_id, &request.name).await?;

    Ok((StatusCode::CREATED, Json(label)))
}

/// PUT /api/users/:id/labels/:label_id
pub async fn rename_label(
    State(state): State<AppState>,
    Path((user_id, label_id)): Path<(i64, i64)>,
    Json(request): Json<RenameLabelRequest>,
) -> ApiResult<StatusCode> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Label name is required".to_string()));
    }

    labels::update_label_name(&state.db, label_id, user_id, &request.name).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/:id/labels/:label_id
pub async fn delete_label(
    State(state): State<AppState>,
    Path((user_id, label_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    labels::delete_label(&state.db, label_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build label routes
pub fn label_routes() -> Router<AppState> {
    Router::new()
        .route("/api/labels/system", get(get_system_labels))
        .route("/api/users/:id/labels", get(get_user_labels))
        .route("/api/users/:id/labels", post(create_label))
        .route("/api/users/:id/labels/:label_id", put(rename_label))
        .route("/api/users/:id/labels/:label_id", delete(delete_label))
}
