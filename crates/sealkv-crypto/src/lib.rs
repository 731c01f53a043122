//! Cipher capabilities for sealkv.
//!
//! A [`CipherProvider`] bundles the optional symmetric and asymmetric
//! capabilities, each with an optional async twin. [`EncryptionMode`] picks
//! exactly one of them when a store is built, so encrypt/decrypt calls never
//! inspect capabilities again.
//!
//! Built-in capabilities:
//! - [`AesGcmCipher`]: AES-256-GCM with a per-value HKDF-SHA256 derived key
//! - [`SealedBoxCipher`]: X25519 ephemeral ECDH sealed to a public key

mod aead;
pub mod aes;
pub mod error;
pub mod key;
pub mod mode;
pub mod provider;
pub mod sealed;

pub use aes::AesGcmCipher;
pub use error::{CryptoError, Result};
pub use key::{KeyMaterial, KeyPair, KeySlot};
pub use mode::{EncryptionMode, ModeKind};
pub use provider::{
    AsymmetricCipher, AsyncAsymmetricCipher, AsyncSymmetricCipher, CipherProvider,
    SymmetricCipher,
};
pub use sealed::SealedBoxCipher;
