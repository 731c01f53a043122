//! Error types for cipher operations.

use crate::key::KeySlot;
use thiserror::Error;

/// Errors raised by cipher capabilities and mode dispatch.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Key mismatch: mode needs a {expected} key, got {found}")]
    KeyMismatch { expected: KeySlot, found: KeySlot },

    #[error("No cipher configured")]
    NoCipherConfigured,

    #[error("Cipher task failed: {0}")]
    Task(String),
}

/// Convenience result alias for cipher operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
