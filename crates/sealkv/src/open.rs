//! Build a store from configuration.

use std::sync::Arc;

use sealkv_core::config::{CipherConfig, StorageBackend, VaultBackend};
use sealkv_core::Config;
use sealkv_crypto::{AesGcmCipher, CipherProvider, SealedBoxCipher};
use sealkv_keychain::{CredentialVault, KeyringVault, MemoryVault};
use sealkv_storage::{FileMap, MemoryMap, PersistentMap};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::options::StoreOptions;
use crate::store::EncryptedStore;

/// Open the store described by `config`.
///
/// Validates the configuration, then wires the vault, map, and cipher
/// capabilities it names. Every call builds an independent store with its
/// own key cache, so open each configuration once per process and share the
/// returned store.
pub fn open(config: &Config) -> Result<EncryptedStore> {
    config.validate()?;

    let vault: Arc<dyn CredentialVault> = match config.vault.backend {
        VaultBackend::Keyring => Arc::new(KeyringVault::new(config.vault.account.clone())),
        VaultBackend::Memory => Arc::new(MemoryVault::new()),
    };

    let map: Arc<dyn PersistentMap> = match (config.storage.backend, config.data_path()?) {
        (StorageBackend::File, Some(path)) => {
            Arc::new(FileMap::open(path).map_err(|e| StoreError::map("open", e))?)
        }
        _ => Arc::new(MemoryMap::new()),
    };

    let cipher = cipher_from_config(&config.cipher);
    let store = EncryptedStore::new(vault, cipher, map, StoreOptions::from_config(config));
    info!(
        vault = ?config.vault.backend,
        storage = ?config.storage.backend,
        mode = %store.mode(),
        "store opened"
    );
    Ok(store)
}

/// The built-in cipher capabilities enabled by `config`.
pub fn cipher_from_config(config: &CipherConfig) -> CipherProvider {
    let mut provider = CipherProvider::new();
    if config.symmetric {
        provider = provider.with_symmetric(AesGcmCipher::new());
        if config.async_primitives {
            provider = provider.with_async_symmetric(AesGcmCipher::new());
        }
    }
    if config.asymmetric {
        provider = provider.with_asymmetric(SealedBoxCipher::new());
        if config.async_primitives {
            provider = provider.with_async_asymmetric(SealedBoxCipher::new());
        }
    }
    provider
}
