//! Map error types.

use thiserror::Error;

/// Errors that can occur during map operations.
#[derive(Debug, Error)]
pub enum MapError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for map operations.
pub type Result<T> = std::result::Result<T, MapError>;
