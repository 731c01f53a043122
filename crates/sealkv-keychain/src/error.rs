//! Error types for vault operations.

use thiserror::Error;

/// Errors raised by credential vault backends.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault read failed for '{service}': {reason}")]
    Read { service: String, reason: String },

    #[error("Vault write failed for '{service}': {reason}")]
    Write { service: String, reason: String },

    #[error("Vault delete failed for '{service}': {reason}")]
    Delete { service: String, reason: String },

    #[error("Vault task failed: {0}")]
    Task(String),
}

/// Convenience result alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
