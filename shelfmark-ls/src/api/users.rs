//! User account endpoints
//!
//! Registration, profile reads and edits, and account deletion with its
//! full cascade. Responses never carry the stored password value.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shelfmark_common::db::models::{NewUser, User};

use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// User representation returned by the API, without the password
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub account: String,
    pub display_name: String,
    pub avatar: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            account: user.account,
            display_name: user.display_name,
            avatar: user.avatar,
        }
    }
}

/// Profile edit request; absent fields keep their current value
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub account: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
}

/// POST /api/users
pub async fn register_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if new_user.account.trim().is_empty() {
        return Err(ApiError::BadRequest("Account name is required".to_string()));
    }

    let id = users::add_user(&state.db, &new_user).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id,
            account: new_user.account,
            display_name: new_user.display_name,
            avatar: new_user.avatar,
        }),
    ))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = users::get_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} does not exist", user_id)))?;

    Ok(Json(user.into()))
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let mut user = users::get_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} does not exist", user_id)))?;

    if let Some(account) = request.account {
        user.account = account;
    }
    if let Some(password) = request.password {
        user.password = password;
    }
    if let Some(display_name) = request.display_name {
        user.display_name = display_name;
    }
    if let Some(avatar) = request.avatar {
        user.avatar = avatar;
    }

    users::update_user(&state.db, &user).await?;

    Ok(Json(user.into()))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.library.delete_account(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build user account routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(register_user))
        .route("/api/users/:id", get(get_user))
        .route("/api/users/:id", put(update_user))
        .route("/api/users/:id", delete(delete_user))
}
