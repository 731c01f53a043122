//! Key lifecycle: cache, vault, or generate-and-persist.
//!
//! The active key is resolved in priority order:
//! 1. The in-process cache
//! 2. The credential vault entry for the slot
//! 3. Generate a new key and persist it to the vault
//!
//! Resolution is single-flight. Concurrent first callers wait on one
//! resolution and all observe the same key, so two callers can never each
//! persist their own key. A failed resolution caches nothing and the next
//! caller starts over. Once cached, the key never changes for the life of
//! the manager.

use std::sync::Arc;

use sealkv_core::SecretString;
use sealkv_crypto::{CipherProvider, KeyMaterial, KeyPair, KeySlot};
use sealkv_keychain::CredentialVault;
use tokio::sync::{broadcast, OnceCell};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::events::{EventBus, StoreEvent};
use crate::options::StoreOptions;
use crate::timeout::bounded;

/// Owns the active key of a store.
pub struct KeyManager {
    vault: Arc<dyn CredentialVault>,
    cipher: CipherProvider,
    options: StoreOptions,
    active: OnceCell<KeyMaterial>,
    events: EventBus,
}

impl KeyManager {
    pub fn new(
        vault: Arc<dyn CredentialVault>,
        cipher: CipherProvider,
        options: StoreOptions,
        events: EventBus,
    ) -> Self {
        Self {
            vault,
            cipher,
            options,
            active: OnceCell::new(),
            events,
        }
    }

    /// The symmetric secret, resolving it on first use.
    pub async fn symmetric_key(&self) -> Result<SecretString> {
        match self.resolve(KeySlot::Symmetric).await? {
            KeyMaterial::Symmetric(secret) => Ok(secret.clone()),
            other => Err(self.mismatch(other, KeySlot::Symmetric)),
        }
    }

    /// The asymmetric keypair, resolving it on first use.
    pub async fn asymmetric_key(&self) -> Result<KeyPair> {
        match self.resolve(KeySlot::Asymmetric).await? {
            KeyMaterial::Asymmetric(pair) => Ok(pair.clone()),
            other => Err(self.mismatch(other, KeySlot::Asymmetric)),
        }
    }

    /// Resolve the active key for `slot`.
    ///
    /// Fails with [`StoreError::ActiveKeyMismatch`] if the other slot is
    /// already active: a manager holds at most one key.
    pub async fn resolve(&self, slot: KeySlot) -> Result<&KeyMaterial> {
        let material = self
            .active
            .get_or_try_init(|| self.load_or_generate(slot))
            .await?;
        if material.slot() != slot {
            return Err(self.mismatch(material, slot));
        }
        Ok(material)
    }

    /// Slot of the cached key, if one has been resolved.
    pub fn active_slot(&self) -> Option<KeySlot> {
        self.active.get().map(KeyMaterial::slot)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn mismatch(&self, active: &KeyMaterial, requested: KeySlot) -> StoreError {
        StoreError::ActiveKeyMismatch {
            active: active.slot(),
            requested,
        }
    }

    async fn load_or_generate(&self, slot: KeySlot) -> Result<KeyMaterial> {
        let service = self.options.service(slot);

        if let Some(secret) = self.read_vault(service).await {
            match decode_entry(slot, secret) {
                Ok(material) => {
                    debug!(%slot, service, "using key from vault");
                    self.events.emit(StoreEvent::KeyLoaded { slot });
                    return Ok(material);
                }
                Err(reason) => self.report_read_failure(service, reason),
            }
        }

        info!(%slot, service, "generating new key");
        let (material, entry) = self.generate(slot)?;
        self.write_vault(service, &entry).await?;
        self.events.emit(StoreEvent::KeyGenerated { slot });
        info!(%slot, service, "new key persisted to vault");
        Ok(material)
    }

    fn generate(&self, slot: KeySlot) -> Result<(KeyMaterial, SecretString)> {
        let generation_failed = |e: sealkv_crypto::CryptoError| {
            StoreError::KeyGenerationFailed(e.to_string())
        };
        match slot {
            KeySlot::Symmetric => {
                let secret = self
                    .cipher
                    .generate_symmetric_key(self.options.key_bits)
                    .map_err(generation_failed)?;
                Ok((KeyMaterial::Symmetric(secret.clone()), secret))
            }
            KeySlot::Asymmetric => {
                let pair = self.cipher.generate_keypair().map_err(generation_failed)?;
                let entry = pair.to_vault_secret().map_err(generation_failed)?;
                Ok((KeyMaterial::Asymmetric(pair), entry))
            }
        }
    }

    /// Read a vault entry. Every failure is reported and treated as absent.
    ///
    /// A timed-out read counts as a failure too, and the caller then writes a
    /// fresh key over the one it could not read. Values encrypted under the
    /// old key are lost, so the timeout must comfortably cover an OS unlock
    /// prompt when the vault is the platform keyring.
    async fn read_vault(&self, service: &str) -> Option<SecretString> {
        let result = bounded(self.options.timeout, "vault read", self.vault.get_secret(service))
            .await
            .and_then(|r| {
                r.map_err(|e| StoreError::VaultReadFailed {
                    service: service.to_string(),
                    reason: e.to_string(),
                })
            });

        match result {
            Ok(Some(secret)) if !secret.is_empty() => Some(secret),
            Ok(_) => None,
            Err(e @ StoreError::Timeout { .. }) => {
                warn!(
                    service,
                    "vault read timed out; a new key will replace the unread entry"
                );
                self.report_read_failure(service, e.to_string());
                None
            }
            Err(e) => {
                self.report_read_failure(service, e.to_string());
                None
            }
        }
    }

    /// Persist a freshly generated key. Failures propagate: a key that cannot
    /// survive a restart must never encrypt anything.
    async fn write_vault(&self, service: &str, entry: &SecretString) -> Result<()> {
        let write_failed = |reason: String| StoreError::VaultWriteFailed {
            service: service.to_string(),
            reason,
        };
        bounded(
            self.options.timeout,
            "vault write",
            self.vault.set_secret(service, entry),
        )
        .await
        .map_err(|e| write_failed(e.to_string()))?
        .map_err(|e| write_failed(e.to_string()))
    }

    fn report_read_failure(&self, service: &str, reason: String) {
        warn!(service, %reason, "vault read failed, treating entry as absent");
        self.events.emit(StoreEvent::VaultReadFailed {
            service: service.to_string(),
            reason,
        });
    }
}

fn decode_entry(slot: KeySlot, secret: SecretString) -> std::result::Result<KeyMaterial, String> {
    match slot {
        KeySlot::Symmetric => Ok(KeyMaterial::Symmetric(secret)),
        KeySlot::Asymmetric => KeyPair::from_vault_secret(&secret)
            .map(KeyMaterial::Asymmetric)
            .map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sealkv_keychain::{MemoryVault, VaultError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts calls and delays reads so concurrent callers overlap.
    #[derive(Default)]
    struct CountingVault {
        inner: MemoryVault,
        reads: AtomicUsize,
        writes: AtomicUsize,
        fail_reads: bool,
        fail_writes: bool,
    }

    #[async_trait]
    impl CredentialVault for CountingVault {
        async fn get_secret(&self, service: &str) -> sealkv_keychain::Result<Option<SecretString>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail_reads {
                return Err(VaultError::Read {
                    service: service.to_string(),
                    reason: "locked".to_string(),
                });
            }
            self.inner.get_secret(service).await
        }

        async fn set_secret(&self, service: &str, secret: &SecretString) -> sealkv_keychain::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(VaultError::Write {
                    service: service.to_string(),
                    reason: "read-only".to_string(),
                });
            }
            self.inner.set_secret(service, secret).await
        }

        async fn delete_secret(&self, service: &str) -> sealkv_keychain::Result<()> {
            self.inner.delete_secret(service).await
        }
    }

    fn manager(vault: Arc<dyn CredentialVault>, cipher: CipherProvider) -> KeyManager {
        KeyManager::new(vault, cipher, StoreOptions::default(), EventBus::default())
    }

    #[tokio::test]
    async fn test_generates_once_then_caches() {
        let vault = Arc::new(CountingVault::default());
        let keys = manager(vault.clone(), CipherProvider::aes_gcm());
        assert_eq!(keys.active_slot(), None);

        let first = keys.symmetric_key().await.unwrap();
        let second = keys.symmetric_key().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(vault.reads.load(Ordering::SeqCst), 1);
        assert_eq!(vault.writes.load(Ordering::SeqCst), 1);
        assert_eq!(keys.active_slot(), Some(KeySlot::Symmetric));
    }

    #[tokio::test]
    async fn test_restart_loads_persisted_key() {
        let vault = MemoryVault::new();
        let before = manager(Arc::new(vault.clone()), CipherProvider::aes_gcm())
            .symmetric_key()
            .await
            .unwrap();

        let restarted = manager(Arc::new(vault.clone()), CipherProvider::aes_gcm());
        let mut events = restarted.subscribe();
        let after = restarted.symmetric_key().await.unwrap();

        assert_eq!(before, after);
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::KeyLoaded {
                slot: KeySlot::Symmetric
            }
        );
    }

    #[tokio::test]
    async fn test_keypair_persisted_as_json() {
        let vault = MemoryVault::new();
        let keys = manager(Arc::new(vault.clone()), CipherProvider::sealed_box());
        let pair = keys.asymmetric_key().await.unwrap();

        let entry = vault
            .get_secret(sealkv_keychain::ASYMMETRIC_SERVICE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(KeyPair::from_vault_secret(&entry).unwrap(), pair);
        assert!(vault
            .get_secret(sealkv_keychain::SYMMETRIC_SERVICE)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_concurrent_first_resolution_is_single_flight() {
        let vault = Arc::new(CountingVault::default());
        let keys = Arc::new(manager(vault.clone(), CipherProvider::aes_gcm()));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let keys = keys.clone();
                tokio::spawn(async move { keys.symmetric_key().await.unwrap() })
            })
            .collect();

        let mut resolved = Vec::new();
        for task in tasks {
            resolved.push(task.await.unwrap());
        }

        assert_eq!(vault.writes.load(Ordering::SeqCst), 1);
        assert_eq!(vault.reads.load(Ordering::SeqCst), 1);
        assert!(resolved.iter().all(|k| *k == resolved[0]));
        assert_eq!(
            vault.inner.get_secret(sealkv_keychain::SYMMETRIC_SERVICE).await.unwrap(),
            Some(resolved[0].clone())
        );
    }

    #[tokio::test]
    async fn test_write_failure_propagates_and_caches_nothing() {
        let vault = Arc::new(CountingVault {
            fail_writes: true,
            ..Default::default()
        });
        let keys = manager(vault.clone(), CipherProvider::aes_gcm());

        let result = keys.symmetric_key().await;
        assert!(matches!(result, Err(StoreError::VaultWriteFailed { .. })));
        assert_eq!(keys.active_slot(), None);

        // the next call tries again instead of reusing an unpersisted key
        assert!(keys.symmetric_key().await.is_err());
        assert_eq!(vault.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_read_failure_degrades_to_generation() {
        let vault = Arc::new(CountingVault {
            fail_reads: true,
            ..Default::default()
        });
        let keys = manager(vault.clone(), CipherProvider::aes_gcm());
        let mut events = keys.subscribe();

        keys.symmetric_key().await.unwrap();

        assert!(matches!(
            events.try_recv().unwrap(),
            StoreEvent::VaultReadFailed { .. }
        ));
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::KeyGenerated {
                slot: KeySlot::Symmetric
            }
        );
    }

    #[tokio::test]
    async fn test_generation_without_capability() {
        let keys = manager(Arc::new(MemoryVault::new()), CipherProvider::new());
        assert!(matches!(
            keys.symmetric_key().await,
            Err(StoreError::KeyGenerationFailed(_))
        ));
        assert!(matches!(
            keys.asymmetric_key().await,
            Err(StoreError::KeyGenerationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_stored_key_used_without_generator() {
        let vault = MemoryVault::new();
        vault
            .set_secret(sealkv_keychain::SYMMETRIC_SERVICE, &SecretString::new("stored"))
            .await
            .unwrap();

        let keys = manager(Arc::new(vault), CipherProvider::new());
        assert_eq!(
            keys.symmetric_key().await.unwrap(),
            SecretString::new("stored")
        );
    }

    #[tokio::test]
    async fn test_malformed_keypair_entry_is_replaced() {
        let vault = MemoryVault::new();
        vault
            .set_secret(sealkv_keychain::ASYMMETRIC_SERVICE, &SecretString::new("garbage"))
            .await
            .unwrap();

        let keys = manager(Arc::new(vault.clone()), CipherProvider::sealed_box());
        let pair = keys.asymmetric_key().await.unwrap();

        let entry = vault
            .get_secret(sealkv_keychain::ASYMMETRIC_SERVICE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(KeyPair::from_vault_secret(&entry).unwrap(), pair);
    }

    #[tokio::test]
    async fn test_one_active_key_per_manager() {
        let cipher = CipherProvider::aes_gcm().with_asymmetric(sealkv_crypto::SealedBoxCipher::new());
        let keys = manager(Arc::new(MemoryVault::new()), cipher);

        keys.symmetric_key().await.unwrap();
        assert!(matches!(
            keys.asymmetric_key().await,
            Err(StoreError::ActiveKeyMismatch {
                active: KeySlot::Symmetric,
                requested: KeySlot::Asymmetric
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_vault_read_replaces_unread_key() {
        struct LockedVault {
            inner: MemoryVault,
        }

        #[async_trait]
        impl CredentialVault for LockedVault {
            async fn get_secret(&self, _service: &str) -> sealkv_keychain::Result<Option<SecretString>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(None)
            }
            async fn set_secret(&self, service: &str, secret: &SecretString) -> sealkv_keychain::Result<()> {
                self.inner.set_secret(service, secret).await
            }
            async fn delete_secret(&self, service: &str) -> sealkv_keychain::Result<()> {
                self.inner.delete_secret(service).await
            }
        }

        let inner = MemoryVault::new();
        let original = SecretString::new("unreadable-original");
        inner
            .set_secret(sealkv_keychain::SYMMETRIC_SERVICE, &original)
            .await
            .unwrap();

        let keys = KeyManager::new(
            Arc::new(LockedVault {
                inner: inner.clone(),
            }),
            CipherProvider::aes_gcm(),
            StoreOptions::default().with_timeout(Duration::from_millis(500)),
            EventBus::default(),
        );
        let mut events = keys.subscribe();

        let resolved = keys.symmetric_key().await.unwrap();

        assert_ne!(resolved, original);
        assert!(matches!(
            events.try_recv().unwrap(),
            StoreEvent::VaultReadFailed { reason, .. } if reason.contains("timed out")
        ));
        assert_eq!(
            inner.get_secret(sealkv_keychain::SYMMETRIC_SERVICE).await.unwrap(),
            Some(resolved)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_vault_write_times_out() {
        struct StuckVault;

        #[async_trait]
        impl CredentialVault for StuckVault {
            async fn get_secret(&self, _service: &str) -> sealkv_keychain::Result<Option<SecretString>> {
                Ok(None)
            }
            async fn set_secret(&self, _service: &str, _secret: &SecretString) -> sealkv_keychain::Result<()> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
            async fn delete_secret(&self, _service: &str) -> sealkv_keychain::Result<()> {
                Ok(())
            }
        }

        let keys = KeyManager::new(
            Arc::new(StuckVault),
            CipherProvider::aes_gcm(),
            StoreOptions::default().with_timeout(Duration::from_millis(500)),
            EventBus::default(),
        );
        assert!(matches!(
            keys.symmetric_key().await,
            Err(StoreError::VaultWriteFailed { .. })
        ));
    }
}
