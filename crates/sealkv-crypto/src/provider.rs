//! Cipher capability traits and the provider that bundles them.

use std::sync::Arc;

use async_trait::async_trait;
use sealkv_core::SecretString;

use crate::error::{CryptoError, Result};
use crate::key::KeyPair;

/// Synchronous symmetric capability. Keys and ciphertexts are strings.
pub trait SymmetricCipher: Send + Sync {
    /// Generate a new key of `bits` bits.
    fn generate_key(&self, bits: u32) -> Result<SecretString>;

    fn encrypt(&self, data: &str, key: &str) -> Result<String>;

    fn decrypt(&self, data: &str, key: &str) -> Result<String>;
}

/// Async twin of [`SymmetricCipher`], preferred when registered.
#[async_trait]
pub trait AsyncSymmetricCipher: Send + Sync {
    async fn encrypt(&self, data: &str, key: &str) -> Result<String>;

    async fn decrypt(&self, data: &str, key: &str) -> Result<String>;
}

/// Synchronous asymmetric capability.
pub trait AsymmetricCipher: Send + Sync {
    fn generate_keypair(&self) -> Result<KeyPair>;

    fn encrypt(&self, data: &str, public_key: &str) -> Result<String>;

    fn decrypt(&self, data: &str, private_key: &str) -> Result<String>;
}

/// Async twin of [`AsymmetricCipher`], preferred when registered.
#[async_trait]
pub trait AsyncAsymmetricCipher: Send + Sync {
    async fn encrypt(&self, data: &str, public_key: &str) -> Result<String>;

    async fn decrypt(&self, data: &str, private_key: &str) -> Result<String>;
}

/// The set of cipher capabilities available to a store.
///
/// Every capability is optional. Key generation always goes through the
/// synchronous trait of the matching capability.
#[derive(Clone, Default)]
pub struct CipherProvider {
    pub(crate) symmetric: Option<Arc<dyn SymmetricCipher>>,
    pub(crate) symmetric_async: Option<Arc<dyn AsyncSymmetricCipher>>,
    pub(crate) asymmetric: Option<Arc<dyn AsymmetricCipher>>,
    pub(crate) asymmetric_async: Option<Arc<dyn AsyncAsymmetricCipher>>,
}

impl CipherProvider {
    /// A provider with no capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// AES-256-GCM with its async twin.
    pub fn aes_gcm() -> Self {
        let cipher = Arc::new(crate::AesGcmCipher::new());
        Self {
            symmetric: Some(cipher.clone()),
            symmetric_async: Some(cipher),
            ..Self::default()
        }
    }

    /// X25519 sealed boxes with the async twin.
    pub fn sealed_box() -> Self {
        let cipher = Arc::new(crate::SealedBoxCipher::new());
        Self {
            asymmetric: Some(cipher.clone()),
            asymmetric_async: Some(cipher),
            ..Self::default()
        }
    }

    pub fn with_symmetric(mut self, cipher: impl SymmetricCipher + 'static) -> Self {
        self.symmetric = Some(Arc::new(cipher));
        self
    }

    pub fn with_async_symmetric(mut self, cipher: impl AsyncSymmetricCipher + 'static) -> Self {
        self.symmetric_async = Some(Arc::new(cipher));
        self
    }

    pub fn with_asymmetric(mut self, cipher: impl AsymmetricCipher + 'static) -> Self {
        self.asymmetric = Some(Arc::new(cipher));
        self
    }

    pub fn with_async_asymmetric(mut self, cipher: impl AsyncAsymmetricCipher + 'static) -> Self {
        self.asymmetric_async = Some(Arc::new(cipher));
        self
    }

    /// Drop the async twins so dispatch uses the synchronous primitives.
    pub fn without_async(mut self) -> Self {
        self.symmetric_async = None;
        self.asymmetric_async = None;
        self
    }

    pub fn has_symmetric(&self) -> bool {
        self.symmetric.is_some() || self.symmetric_async.is_some()
    }

    pub fn has_asymmetric(&self) -> bool {
        self.asymmetric.is_some() || self.asymmetric_async.is_some()
    }

    /// Generate a symmetric key through the registered capability.
    pub fn generate_symmetric_key(&self, bits: u32) -> Result<SecretString> {
        let cipher = self.symmetric.as_ref().ok_or_else(|| {
            CryptoError::KeyGeneration("no symmetric key generator configured".to_string())
        })?;
        let key = cipher.generate_key(bits)?;
        if key.is_empty() {
            return Err(CryptoError::KeyGeneration(
                "symmetric key generator returned an empty key".to_string(),
            ));
        }
        Ok(key)
    }

    /// Generate a keypair through the registered capability.
    pub fn generate_keypair(&self) -> Result<KeyPair> {
        let cipher = self.asymmetric.as_ref().ok_or_else(|| {
            CryptoError::KeyGeneration("no keypair generator configured".to_string())
        })?;
        let pair = cipher.generate_keypair()?;
        if pair.public_key.is_empty() || pair.private_key.is_empty() {
            return Err(CryptoError::KeyGeneration(
                "keypair generator returned an empty key".to_string(),
            ));
        }
        Ok(pair)
    }
}

impl std::fmt::Debug for CipherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherProvider")
            .field("symmetric", &self.symmetric.is_some())
            .field("symmetric_async", &self.symmetric_async.is_some())
            .field("asymmetric", &self.asymmetric.is_some())
            .field("asymmetric_async", &self.asymmetric_async.is_some())
            .finish()
    }
}
