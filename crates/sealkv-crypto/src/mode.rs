//! Encryption-mode dispatch.
//!
//! The mode is chosen once from a [`CipherProvider`]: symmetric wins over
//! asymmetric, and within a capability the async twin wins over the
//! synchronous primitive.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{CryptoError, Result};
use crate::key::{KeyMaterial, KeySlot};
use crate::provider::{
    AsymmetricCipher, AsyncAsymmetricCipher, AsyncSymmetricCipher, CipherProvider,
    SymmetricCipher,
};

/// Which primitive a store dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    SymmetricAsync,
    SymmetricSync,
    AsymmetricAsync,
    AsymmetricSync,
    None,
}

impl ModeKind {
    /// The key slot this mode encrypts with.
    pub fn slot(self) -> Option<KeySlot> {
        match self {
            Self::SymmetricAsync | Self::SymmetricSync => Some(KeySlot::Symmetric),
            Self::AsymmetricAsync | Self::AsymmetricSync => Some(KeySlot::Asymmetric),
            Self::None => None,
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SymmetricAsync => "symmetric (async)",
            Self::SymmetricSync => "symmetric (sync)",
            Self::AsymmetricAsync => "asymmetric (async)",
            Self::AsymmetricSync => "asymmetric (sync)",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// The single primitive a store encrypts and decrypts with.
#[derive(Clone)]
pub enum EncryptionMode {
    SymmetricAsync(Arc<dyn AsyncSymmetricCipher>),
    SymmetricSync(Arc<dyn SymmetricCipher>),
    AsymmetricAsync(Arc<dyn AsyncAsymmetricCipher>),
    AsymmetricSync(Arc<dyn AsymmetricCipher>),
    None,
}

impl EncryptionMode {
    /// Inspect the provider once and pick the mode.
    pub fn select(provider: &CipherProvider) -> Self {
        if let Some(cipher) = &provider.symmetric_async {
            Self::SymmetricAsync(cipher.clone())
        } else if let Some(cipher) = &provider.symmetric {
            Self::SymmetricSync(cipher.clone())
        } else if let Some(cipher) = &provider.asymmetric_async {
            Self::AsymmetricAsync(cipher.clone())
        } else if let Some(cipher) = &provider.asymmetric {
            Self::AsymmetricSync(cipher.clone())
        } else {
            Self::None
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Self::SymmetricAsync(_) => ModeKind::SymmetricAsync,
            Self::SymmetricSync(_) => ModeKind::SymmetricSync,
            Self::AsymmetricAsync(_) => ModeKind::AsymmetricAsync,
            Self::AsymmetricSync(_) => ModeKind::AsymmetricSync,
            Self::None => ModeKind::None,
        }
    }

    pub fn slot(&self) -> Option<KeySlot> {
        self.kind().slot()
    }

    /// Encrypt `data` with the public half (asymmetric) or the secret (symmetric).
    pub async fn encrypt(&self, data: &str, key: &KeyMaterial) -> Result<String> {
        match self {
            Self::SymmetricAsync(cipher) => {
                cipher.encrypt(data, key.as_symmetric()?.expose_secret()).await
            }
            Self::SymmetricSync(cipher) => {
                cipher.encrypt(data, key.as_symmetric()?.expose_secret())
            }
            Self::AsymmetricAsync(cipher) => {
                cipher.encrypt(data, &key.as_keypair()?.public_key).await
            }
            Self::AsymmetricSync(cipher) => cipher.encrypt(data, &key.as_keypair()?.public_key),
            Self::None => Err(CryptoError::NoCipherConfigured),
        }
    }

    /// Decrypt `data` with the private half (asymmetric) or the secret (symmetric).
    pub async fn decrypt(&self, data: &str, key: &KeyMaterial) -> Result<String> {
        match self {
            Self::SymmetricAsync(cipher) => {
                cipher.decrypt(data, key.as_symmetric()?.expose_secret()).await
            }
            Self::SymmetricSync(cipher) => {
                cipher.decrypt(data, key.as_symmetric()?.expose_secret())
            }
            Self::AsymmetricAsync(cipher) => {
                let pair = key.as_keypair()?;
                cipher.decrypt(data, pair.private_key.expose_secret()).await
            }
            Self::AsymmetricSync(cipher) => {
                let pair = key.as_keypair()?;
                cipher.decrypt(data, pair.private_key.expose_secret())
            }
            Self::None => Err(CryptoError::NoCipherConfigured),
        }
    }
}

impl fmt::Debug for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptionMode").field(&self.kind()).finish()
    }
}
