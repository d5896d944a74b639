//! Shelf endpoints
//!
//! Everything scoped to one user's shelf: listing with status and label
//! filters, adding a resolved book (with optional labels and an initial
//! reading status), removal, recommendations, per-book reading status,
//! and per-book label attachments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shelfmark_common::db::models::{Book, BookMetadata, Label, ReadingState, ReadingStatus};

use crate::db::{books, labels, reading_status};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Shelf listing filters; at most one applies, status before label
#[derive(Debug, Default, Deserialize)]
pub struct ShelfQuery {
    pub status: Option<String>,
    pub label: Option<i64>,
}

/// Add-to-shelf request: the resolved metadata plus optional initial state
#[derive(Debug, Deserialize)]
pub struct AddBookRequest {
    #[serde(flatten)]
    pub metadata: BookMetadata,
    /// Labels to attach right away, by id
    #[serde(default)]
    pub label_ids: Vec<i64>,
    /// Initial reading status; defaults to to-read
    pub status: Option<ReadingStatus>,
    pub finished_on: Option<NaiveDate>,
}

/// Add-to-shelf outcome
#[derive(Debug, Serialize)]
pub struct AddBookResponse {
    /// False when the shelf already had the ISBN
    pub created: bool,
    /// Canonical book id either way
    pub book_id: i64,
}

/// Reading status update request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: ReadingStatus,
    pub finished_on: Option<NaiveDate>,
}

/// Label attachment request: an existing label by id, or a name to
/// create-and-attach through the service path
#[derive(Debug, Deserialize)]
pub struct AttachLabelRequest {
    pub label_id: Option<i64>,
    pub name: Option<String>,
    /// Only meaningful with `name`; defaults to a personalized label
    #[serde(default = "default_personalized")]
    pub personalized: bool,
}

fn default_personalized() -> bool {
    true
}

/// Label attachment outcome
#[derive(Debug, Serialize)]
pub struct AttachLabelResponse {
    pub label_id: i64,
}

fn parse_status(raw: &str) -> ApiResult<ReadingStatus> {
    ReadingStatus::parse(raw)
        .map_err(|_| ApiError::BadRequest(format!("Unknown reading status: {}", raw)))
}

/// GET /api/users/:id/books
pub async fn get_shelf(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ShelfQuery>,
) -> ApiResult<Json<Vec<Book>>> {
    let shelf = match (&query.status, query.label) {
        (Some(raw), _) => {
            let status = parse_status(raw)?;
            books::get_books_with_status(&state.db, user_id, status).await?
        }
        (None, Some(label_id)) => books::get_books_with_label(&state.db, label_id, user_id).await?,
        (None, None) => books::get_user_books(&state.db, user_id).await?,
    };

    Ok(Json(shelf))
}

/// POST /api/users/:id/books
pub async fn add_book(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<AddBookRequest>,
) -> ApiResult<(StatusCode, Json<AddBookResponse>)> {
    let (created, book_id) = state
        .library
        .add_book_if_not_exists_with_id(user_id, &request.metadata)
        .await?;

    for label_id in &request.label_ids {
        labels::add_label_to_book(&state.db, book_id, *label_id, user_id).await?;
    }

    if let Some(status) = request.status {
        state
            .library
            .set_reading_status(book_id, user_id, status, request.finished_on)
            .await?;
    }

    let code = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((code, Json(AddBookResponse { created, book_id })))
}

/// DELETE /api/users/:id/books/:book_id
pub async fn remove_book(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    books::remove_book_from_user(&state.db, user_id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/:id/books/:book_id/similar
pub async fn get_similar_books(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Vec<Book>>> {
    let similar = books::find_similar_by_labels(&state.db, book_id, user_id).await?;
    Ok(Json(similar))
}

/// GET /api/users/:id/books/:book_id/status
pub async fn get_reading_status(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(i64, i64)>,
) -> ApiResult<Json<ReadingState>> {
    let status = reading_status::get_status(&state.db, book_id, user_id).await?;
    Ok(Json(status))
}

/// PUT /api/users/:id/books/:book_id/status
pub async fn set_reading_status(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(i64, i64)>,
    Json(request): Json<SetStatusRequest>,
) -> ApiResult<Json<ReadingState>> {
    state
        .library
        .set_reading_status(book_id, user_id, request.status, request.finished_on)
        .await?;

    let status = reading_status::get_status(&state.db, book_id, user_id).await?;
    Ok(Json(status))
}

/// GET /api/users/:id/books/:book_id/labels
pub async fn get_book_labels(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Vec<Label>>> {
    let attached = labels::get_book_labels(&state.db, book_id, user_id).await?;
    Ok(Json(attached))
}

/// POST /api/users/:id/books/:book_id/labels
pub async fn attach_label(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(i64, i64)>,
    Json(request): Json<AttachLabelRequest>,
) -> ApiResult<Json<AttachLabelResponse>> {
    let label_id = match (request.label_id, request.name) {
        (Some(label_id), _) => {
            labels::add_label_to_book(&state.db, book_id, label_id, user_id).await?;
            label_id
        }
        (None, Some(name)) => {
            state
                .library
                .create_label_and_attach(&name, request.personalized, user_id, book_id)
                .await?
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Either label_id or name is required".to_string(),
            ))
        }
    };

    Ok(Json(AttachLabelResponse { label_id }))
}

/// DELETE /api/users/:id/books/:book_id/labels/:label_id
pub async fn detach_label(
    State(state): State<AppState>,
    Path((user_id, book_id, label_id)): Path<(i64, i64, i64)>,
) -> ApiResult<StatusCode> {
    labels::remove_label_from_book(&state.db, book_id, label_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build shelf routes
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:id/books", get(get_shelf))
        .route("/api/users/:id/books", post(add_book))
        .route("/api/users/:id/books/:book_id", delete(remove_book))
        .route("/api/users/:id/books/:book_id/similar", get(get_similar_books))
        .route("/api/users/:id/books/:book_id/status", get(get_reading_status))
        .route("/api/users/:id/books/:book_id/status", put(set_reading_status))
        .route("/api/users/:id/books/:book_id/labels", get(get_book_labels))
        .route("/api/users/:id/books/:book_id/labels", post(attach_label))
        .route(
            "/api/users/:id/books/:book_id/labels/:label_id",
            delete(detach_label),
        )
}
