use thiserror::Error;

/// Errors that can occur during record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// Input rejected before touching the database.
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    /// The row belongs to another club.
    #[error("not allowed to modify {0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
}
