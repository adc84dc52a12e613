use thiserror::Error;

/// Errors from club registration, login and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was missing or blank.
    #[error("{0}")]
    MissingFields(&'static str),
    /// A club with this email already exists.
    #[error("Club already registered")]
    AlreadyRegistered,
    /// Unknown email or wrong password. The two are not distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The stored hash could not be produced or parsed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
    /// A token could not be encoded or decoded.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
