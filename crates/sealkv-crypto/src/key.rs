//! Key material types.

use crate::error::{CryptoError, Result};
use sealkv_core::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of key a vault entry or encryption mode holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySlot {
    Symmetric,
    Asymmetric,
}

impl fmt::Display for KeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symmetric => f.write_str("symmetric"),
            Self::Asymmetric => f.write_str("asymmetric"),
        }
    }
}

/// An asymmetric keypair.
///
/// Stored in the vault as `{"publicKey": "...", "privateKey": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: SecretString,
}

impl KeyPair {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<SecretString>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    /// Serialize to the vault entry format.
    pub fn to_vault_secret(&self) -> Result<SecretString> {
        serde_json::to_string(self)
            .map(SecretString::new)
            .map_err(|e| CryptoError::InvalidKey(format!("keypair serialization failed: {e}")))
    }

    /// Parse the vault entry format.
    pub fn from_vault_secret(secret: &SecretString) -> Result<Self> {
        let pair: Self = serde_json::from_str(secret.expose_secret())
            .map_err(|e| CryptoError::InvalidKey(format!("malformed keypair entry: {e}")))?;
        if pair.public_key.is_empty() || pair.private_key.is_empty() {
            return Err(CryptoError::InvalidKey(
                "keypair entry has an empty component".to_string(),
            ));
        }
        Ok(pair)
    }
}

/// The active key of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    Symmetric(SecretString),
    Asymmetric(KeyPair),
}

impl KeyMaterial {
    pub fn slot(&self) -> KeySlot {
        match self {
            Self::Symmetric(_) => KeySlot::Symmetric,
            Self::Asymmetric(_) => KeySlot::Asymmetric,
        }
    }

    pub fn as_symmetric(&self) -> Result<&SecretString> {
        match self {
            Self::Symmetric(secret) => Ok(secret),
            other => Err(CryptoError::KeyMismatch {
                expected: KeySlot::Symmetric,
                found: other.slot(),
            }),
        }
    }

    pub fn as_keypair(&self) -> Result<&KeyPair> {
        match self {
            Self::Asymmetric(pair) => Ok(pair),
            other => Err(CryptoError::KeyMismatch {
                expected: KeySlot::Asymmetric,
                found: other.slot(),
            }),
        }
    }
}
