//! AES-256-GCM symmetric capability.
//!
//! The stored key is a base64 256-bit master key that is never used as a
//! cipher key directly: each value gets a random salt and an HKDF-SHA256
//! derived key. Ciphertext is base64 of `salt || nonce || ciphertext_with_tag`.

use async_trait::async_trait;
use rand::RngCore;
use sealkv_core::SecretString;
use tracing::debug;
use zeroize::Zeroizing;

use crate::aead::{self, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{CryptoError, Result};
use crate::provider::{AsyncSymmetricCipher, SymmetricCipher};

const SALT_SIZE: usize = 16;

/// Domain-separates derived value keys.
const HKDF_INFO: &[u8] = b"sealkv-value-v1";

/// Built-in symmetric capability. Also implements the async twin, which
/// runs the cipher on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCipher;

impl AesGcmCipher {
    pub fn new() -> Self {
        Self
    }
}

fn encrypt_value(data: &str, key: &str) -> Result<String> {
    let master = aead::decode_key(key, "symmetric key")?;

    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);

    let derived = aead::derive_key(&master[..], &salt, HKDF_INFO)?;
    let sealed = aead::seal(&derived, data.as_bytes())?;

    let mut out = Vec::with_capacity(SALT_SIZE + sealed.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&sealed);
    Ok(aead::encode(&out))
}

fn decrypt_value(data: &str, key: &str) -> Result<String> {
    let master = aead::decode_key(key, "symmetric key")?;
    let raw = aead::decode_ciphertext(data)?;
    if raw.len() < SALT_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Decryption("ciphertext too short".to_string()));
    }

    let (salt, sealed) = raw.split_at(SALT_SIZE);
    let derived = aead::derive_key(&master[..], salt, HKDF_INFO)?;
    aead::into_utf8(aead::open(&derived, sealed)?)
}

impl SymmetricCipher for AesGcmCipher {
    fn generate_key(&self, bits: u32) -> Result<SecretString> {
        if bits as usize != KEY_SIZE * 8 {
            return Err(CryptoError::KeyGeneration(format!(
                "unsupported key size {bits}, only {} bits is supported",
                KEY_SIZE * 8
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        rand::thread_rng().fill_bytes(&mut key[..]);
        debug!(bits, "generated symmetric key");
        Ok(SecretString::new(aead::encode(&key[..])))
    }

    fn encrypt(&self, data: &str, key: &str) -> Result<String> {
        encrypt_value(data, key)
    }

    fn decrypt(&self, data: &str, key: &str) -> Result<String> {
        decrypt_value(data, key)
    }
}

#[async_trait]
impl AsyncSymmetricCipher for AesGcmCipher {
    async fn encrypt(&self, data: &str, key: &str) -> Result<String> {
        let data = data.to_owned();
        let key = Zeroizing::new(key.to_owned());
        tokio::task::spawn_blocking(move || encrypt_value(&data, &key))
            .await
            .map_err(|e| CryptoError::Task(e.to_string()))?
    }

    async fn decrypt(&self, data: &str, key: &str) -> Result<String> {
        let data = data.to_owned();
        let key = Zeroizing::new(key.to_owned());
        tokio::task::spawn_blocking(move || decrypt_value(&data, &key))
            .await
            .map_err(|e| CryptoError::Task(e.to_string()))?
    }
}
