//! Error types for the live channel.

use campus_types::AuthRejection;

/// Failures reported to a caller of the mutation gateway.
///
/// Per-observer delivery problems are never represented here: once a
/// record is appended the publish has succeeded.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// `event` or `update` was missing or blank. Nothing was appended.
    #[error("{0}")]
    Validation(String),

    /// The authorization collaborator rejected the credential. Nothing was
    /// appended.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthRejection),
}

/// Failures while attaching an observer to the live channel.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// A frame could not be serialized.
    #[error("live frame serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The snapshot frame could not be queued for the new observer.
    #[error("failed to queue snapshot for observer {0}")]
    SnapshotQueue(String),
}
