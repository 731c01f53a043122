//! X25519 sealed-box asymmetric capability.
//!
//! Encryption generates an ephemeral X25519 secret, runs ECDH against the
//! recipient public key, and derives an AES-256-GCM key with HKDF-SHA256
//! salted by both public keys. Ciphertext is base64 of
//! `ephemeral_public || nonce || ciphertext_with_tag`. Keys are base64 of
//! the raw 32-byte values.

use async_trait::async_trait;
use rand::rngs::OsRng;
use tracing::warn;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::aead::{self, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{CryptoError, Result};
use crate::key::KeyPair;
use crate::provider::{AsymmetricCipher, AsyncAsymmetricCipher};

const HKDF_INFO: &[u8] = b"sealkv-sealed-box-v1";

/// Built-in asymmetric capability. Also implements the async twin, which
/// runs the cipher on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct SealedBoxCipher;

impl SealedBoxCipher {
    pub fn new() -> Self {
        Self
    }
}

fn kdf_salt(ephemeral: &PublicKey, recipient: &PublicKey) -> [u8; 2 * KEY_SIZE] {
    let mut salt = [0u8; 2 * KEY_SIZE];
    salt[..KEY_SIZE].copy_from_slice(ephemeral.as_bytes());
    salt[KEY_SIZE..].copy_from_slice(recipient.as_bytes());
    salt
}

fn seal_to(data: &str, public_key: &str) -> Result<String> {
    let recipient = PublicKey::from(*aead::decode_key(public_key, "public key")?);

    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&recipient);
    if !shared.was_contributory() {
        warn!("refusing to seal to a low-order public key");
        return Err(CryptoError::InvalidKey(
            "public key is a low-order point".to_string(),
        ));
    }

    let key = aead::derive_key(
        shared.as_bytes(),
        &kdf_salt(&ephemeral_public, &recipient),
        HKDF_INFO,
    )?;
    let sealed = aead::seal(&key, data.as_bytes())?;

    let mut out = Vec::with_capacity(KEY_SIZE + sealed.len());
    out.extend_from_slice(ephemeral_public.as_bytes());
    out.extend_from_slice(&sealed);
    Ok(aead::encode(&out))
}

fn open_with(data: &str, private_key: &str) -> Result<String> {
    let secret = StaticSecret::from(*aead::decode_key(private_key, "private key")?);
    let own_public = PublicKey::from(&secret);

    let raw = aead::decode_ciphertext(data)?;
    if raw.len() < KEY_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Decryption("ciphertext too short".to_string()));
    }
    let (ephemeral_bytes, sealed) = raw.split_at(KEY_SIZE);
    let mut ephemeral = [0u8; KEY_SIZE];
    ephemeral.copy_from_slice(ephemeral_bytes);
    let ephemeral_public = PublicKey::from(ephemeral);

    let shared = secret.diffie_hellman(&ephemeral_public);
    if !shared.was_contributory() {
        return Err(CryptoError::Decryption(
            "ephemeral key is a low-order point".to_string(),
        ));
    }

    let key = aead::derive_key(
        shared.as_bytes(),
        &kdf_salt(&ephemeral_public, &own_public),
        HKDF_INFO,
    )?;
    aead::into_utf8(aead::open(&key, sealed)?)
}

impl AsymmetricCipher for SealedBoxCipher {
    fn generate_keypair(&self) -> Result<KeyPair> {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        let private_bytes = Zeroizing::new(secret.to_bytes());
        Ok(KeyPair::new(
            aead::encode(public.as_bytes()),
            aead::encode(&private_bytes[..]),
        ))
    }

    fn encrypt(&self, data: &str, public_key: &str) -> Result<String> {
        seal_to(data, public_key)
    }

    fn decrypt(&self, data: &str, private_key: &str) -> Result<String> {
        open_with(data, private_key)
    }
}

#[async_trait]
impl AsyncAsymmetricCipher for SealedBoxCipher {
    async fn encrypt(&self, data: &str, public_key: &str) -> Result<String> {
        let data = data.to_owned();
        let public_key = public_key.to_owned();
        tokio::task::spawn_blocking(move || seal_to(&data, &public_key))
            .await
            .map_err(|e| CryptoError::Task(e.to_string()))?
    }

    async fn decrypt(&self, data: &str, private_key: &str) -> Result<String> {
        let data = data.to_owned();
        let private_key = Zeroizing::new(private_key.to_owned());
        tokio::task::spawn_blocking(move || open_with(&data, &private_key))
            .await
            .map_err(|e| CryptoError::Task(e.to_string()))?
    }
}
