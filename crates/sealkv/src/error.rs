//! Error types for the encrypted store.

use std::time::Duration;

use sealkv_core::ConfigError;
use sealkv_crypto::{CryptoError, KeySlot};
use thiserror::Error;

/// Errors surfaced by [`crate::KeyManager`] and [`crate::EncryptedStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("Vault read failed for '{service}': {reason}")]
    VaultReadFailed { service: String, reason: String },

    #[error("Vault write failed for '{service}': {reason}")]
    VaultWriteFailed { service: String, reason: String },

    #[error("No cipher configured")]
    NoCipherConfigured,

    #[error("Encryption failed: {0}")]
    EncryptFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptFailed(String),

    #[error("Map adapter failed during {operation}: {reason}")]
    MapAdapterFailed {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Active key is {active}, cannot resolve a {requested} key")]
    ActiveKeyMismatch { active: KeySlot, requested: KeySlot },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StoreError {
    pub(crate) fn encrypt(err: CryptoError) -> Self {
        match err {
            CryptoError::NoCipherConfigured => Self::NoCipherConfigured,
            other => Self::EncryptFailed(other.to_string()),
        }
    }

    pub(crate) fn decrypt(err: CryptoError) -> Self {
        match err {
            CryptoError::NoCipherConfigured => Self::NoCipherConfigured,
            other => Self::DecryptFailed(other.to_string()),
        }
    }

    pub(crate) fn map(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::MapAdapterFailed {
            operation,
            reason: err.to_string(),
        }
    }
}

/// Convenience result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
