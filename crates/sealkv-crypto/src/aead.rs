//! AES-256-GCM sealing and HKDF-SHA256 key derivation shared by both ciphers.
//!
//! A sealed buffer is `nonce || ciphertext_with_tag`.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

pub(crate) const NONCE_SIZE: usize = 12;
pub(crate) const TAG_SIZE: usize = 16;
pub(crate) const KEY_SIZE: usize = 32;

/// Derive a 256-bit cipher key from `ikm` and `salt`.
pub(crate) fn derive_key(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
    hk.expand(info, &mut okm[..])
        .map_err(|e| CryptoError::Encryption(format!("key derivation failed: {e}")))?;
    Ok(okm)
}

pub(crate) fn seal(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

pub(crate) fn open(key: &[u8; KEY_SIZE], sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Decryption("ciphertext too short".to_string()));
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Decryption("authentication failed".to_string()))
}

pub(crate) fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

pub(crate) fn decode_ciphertext(data: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(data.trim())
        .map_err(|e| CryptoError::Decryption(format!("base64 decode failed: {e}")))
}

/// Decode a base64 key that must be exactly 32 bytes.
pub(crate) fn decode_key(encoded: &str, what: &str) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let bytes = Zeroizing::new(
        BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("{what} is not valid base64: {e}")))?,
    );
    if bytes.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKey(format!(
            "{what} has wrong length: {} (expected {KEY_SIZE})",
            bytes.len()
        )));
    }
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    key.copy_from_slice(&bytes);
    Ok(key)
}

pub(crate) fn into_utf8(plaintext: Zeroizing<Vec<u8>>) -> Result<String> {
    String::from_utf8(plaintext.to_vec())
        .map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {e}")))
}
