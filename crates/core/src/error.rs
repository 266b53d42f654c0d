// Central Error Type for the Application
//
// Variants map to the abstract error taxonomy: Transient, NotFound (modeled as
// Option/empty Vec, not a variant here), PolicyRefused, ParseFailed, ModelRefused
// (modeled as data, not a variant), Programmer (Config), Cancelled.

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("transient error: {0}")]
    Transient(String),

    #[error("policy refused: {0}")]
    PolicyRefused(String),

    #[error("parse failed: {0}")]
    ParseFailed(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should be retried by a `RetryPolicy` (429 / rate
    /// limit / quota wording on a transient error).
    pub fn is_rate_limited(&self) -> bool {
        let msg = match self {
            AppError::Transient(m) | AppError::Http(m) => m.to_lowercase(),
            _ => return false,
        };
        msg.contains("429") || msg.contains("rate limit") || msg.contains("quota")
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}
