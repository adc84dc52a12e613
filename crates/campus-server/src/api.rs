//! Error mapping and shared plumbing for the HTTP handlers.

use crate::AppState;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campus_auth::AuthError;
use campus_live::PublishError;
use campus_records::RecordError;
use campus_types::AuthRejection;
use rusqlite::Connection;
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
///
/// Every variant renders as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<AuthRejection> for ApiError {
    fn from(rejection: AuthRejection) -> Self {
        let message = match rejection {
            AuthRejection::Missing => "Missing Authorization header",
            AuthRejection::Malformed => "Malformed Authorization header",
            AuthRejection::Invalid(_) => "Invalid token",
        };
        ApiError::Unauthorized(message.to_string())
    }
}

impl From<PublishError> for ApiError {
    fn from(e: PublishError) -> Self {
        match e {
            PublishError::Validation(msg) => ApiError::BadRequest(msg),
            PublishError::Unauthorized(rejection) => rejection.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingFields(_) | AuthError::AlreadyRegistered => {
                ApiError::BadRequest(e.to_string())
            }
            AuthError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            AuthError::Hashing(_) | AuthError::Token(_) | AuthError::Database(_) => {
                tracing::error!("credential operation failed: {}", e);
                ApiError::InternalServerError("internal error".to_string())
            }
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Validation(msg) => ApiError::BadRequest(msg),
            RecordError::NotFound(_) => ApiError::NotFound(e.to_string()),
            RecordError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            RecordError::Conflict(msg) => ApiError::Conflict(msg),
            RecordError::Database(_) | RecordError::Json(_) => {
                tracing::error!("record operation failed: {}", e);
                ApiError::InternalServerError("internal error".to_string())
            }
        }
    }
}

/// Runs `f` with a pooled connection on the blocking thread pool.
pub(crate) async fn with_conn<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {}", e)))?;
        f(&mut *conn)
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))?
}
