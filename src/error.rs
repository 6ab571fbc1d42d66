//! Error types for rankgate.

use thiserror::Error;

use crate::auth::HashingError;

/// Common error type for rankgate.
///
/// None of these ever reach a caller of [`crate::auth::Authenticator::authenticate`];
/// that path only surfaces a [`crate::auth::FailureReason`].
#[derive(Error, Debug)]
pub enum RankgateError {
    /// Database error.
    ///
    /// Errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Password hashing could not be set up or performed.
    #[error("hashing error: {0}")]
    Hashing(#[from] HashingError),

    /// Validation error for input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for RankgateError {
    fn from(e: sqlx::Error) -> Self {
        RankgateError::Database(e.to_string())
    }
}

/// Result type alias for rankgate operations.
pub type Result<T> = std::result::Result<T, RankgateError>;
