//! HTTP API error type
//!
//! Translates store and resolution errors into status codes with a JSON
//! error envelope. The core layers never see HTTP; everything below this
//! module reports typed domain errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resolution::ResolveError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409), e.g. a duplicate account name
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External metadata provider failure (502)
    #[error("Upstream provider error: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<shelfmark_common::Error> for ApiError {
    fn from(err: shelfmark_common::Error) -> Self {
        use shelfmark_common::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::ConstraintViolation(msg) => ApiError::Conflict(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidIsbn(_) => ApiError::BadRequest(err.to_string()),
            ResolveError::NoMatch(_) => ApiError::NotFound(err.to_string()),
            ResolveError::Source(source) => ApiError::Upstream(source.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        use shelfmark_common::Error;

        assert!(matches!(
            ApiError::from(Error::NotFound("x".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(Error::ConstraintViolation("x".into())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(Error::InvalidInput("x".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(Error::Internal("x".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_resolve_error_mapping() {
        use crate::providers::SourceError;

        assert!(matches!(
            ApiError::from(ResolveError::InvalidIsbn("123".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(ResolveError::NoMatch("9780306406157".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(ResolveError::Source(SourceError::Network("down".into()))),
            ApiError::Upstream(_)
        ));
    }
}
