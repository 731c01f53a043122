//! The encrypted store.
//!
//! Wraps a [`PersistentMap`] so every value is encrypted before it is
//! written and decrypted after it is read. Keys of the map are stored in
//! the clear; only values are encrypted.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use sealkv_crypto::{CipherProvider, EncryptionMode, KeyMaterial, ModeKind};
use sealkv_keychain::CredentialVault;
use sealkv_storage::PersistentMap;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::events::{EventBus, StoreEvent};
use crate::keys::KeyManager;
use crate::merge::merge_values;
use crate::options::StoreOptions;
use crate::timeout::bounded;

/// Transparent at-rest encryption over a persistent map.
///
/// The encryption mode is fixed at construction. Read operations come in
/// two flavours: `try_*` returns the cause of a failure, the plain variant
/// degrades failures to absence and reports them on the event channel.
/// Write operations always return their errors.
///
/// The key cache belongs to the store, so build one store per vault in a
/// process; two stores over one empty vault may each generate a key.
pub struct EncryptedStore {
    keys: KeyManager,
    mode: EncryptionMode,
    map: Arc<dyn PersistentMap>,
    events: EventBus,
    timeout: Option<Duration>,
}

impl EncryptedStore {
    pub fn new(
        vault: Arc<dyn CredentialVault>,
        cipher: CipherProvider,
        map: Arc<dyn PersistentMap>,
        options: StoreOptions,
    ) -> Self {
        let mode = EncryptionMode::select(&cipher);
        let events = EventBus::new(options.event_capacity);
        let timeout = options.timeout;
        debug!(mode = %mode.kind(), "encrypted store created");

        Self {
            keys: KeyManager::new(vault, cipher, options, events.clone()),
            mode,
            map,
            events,
            timeout,
        }
    }

    /// The encryption mode selected at construction.
    pub fn mode(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn key_manager(&self) -> &KeyManager {
        &self.keys
    }

    /// Subscribe to key lifecycle and degraded-read events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ---- single items ----

    /// Read and decrypt one value.
    pub async fn try_get_item(&self, key: &str) -> Result<Option<String>> {
        let material = self.active_key().await?;
        match self.map_call("get", self.map.get(key)).await? {
            Some(ciphertext) => self.decrypt(material, &ciphertext).await.map(Some),
            None => Ok(None),
        }
    }

    /// Like [`try_get_item`](Self::try_get_item), with failures read as absence.
    pub async fn get_item(&self, key: &str) -> Option<String> {
        self.try_get_item(key)
            .await
            .unwrap_or_else(|e| self.degrade("get_item", e, None))
    }

    /// Encrypt and write one value.
    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let material = self.active_key().await?;
        let ciphertext = self.encrypt(material, value).await?;
        self.map_call("set", self.map.set(key, &ciphertext)).await?;
        debug!(key, "item written");
        Ok(())
    }

    pub async fn try_remove_item(&self, key: &str) -> Result<()> {
        self.map_call("remove", self.map.remove(key)).await
    }

    pub async fn remove_item(&self, key: &str) {
        if let Err(e) = self.try_remove_item(key).await {
            self.degrade("remove_item", e, ());
        }
    }

    /// Merge `value` into the stored value at `key`.
    ///
    /// See [`merge_values`] for the merge rule. If the existing value cannot
    /// be decrypted nothing is written.
    pub async fn merge_item(&self, key: &str, value: &str) -> Result<()> {
        let material = self.active_key().await?;
        let existing = match self.map_call("get", self.map.get(key)).await? {
            Some(ciphertext) => Some(self.decrypt(material, &ciphertext).await?),
            None => None,
        };

        let merged = merge_values(existing.as_deref(), value);
        let ciphertext = self.encrypt(material, &merged).await?;
        self.map_call("set", self.map.set(key, &ciphertext)).await?;
        debug!(key, "item merged");
        Ok(())
    }

    // ---- whole map ----

    pub async fn try_get_all_keys(&self) -> Result<Vec<String>> {
        self.map_call("get_all_keys", self.map.get_all_keys()).await
    }

    pub async fn get_all_keys(&self) -> Vec<String> {
        self.try_get_all_keys()
            .await
            .unwrap_or_else(|e| self.degrade("get_all_keys", e, Vec::new()))
    }

    // ---- batches ----

    /// Read and decrypt several values, one entry per requested key in order.
    ///
    /// Each item is decrypted on its own: an item that fails to decrypt
    /// resolves to `None` and is reported as
    /// [`StoreEvent::ItemDecryptFailed`] without affecting the others.
    pub async fn try_multi_get(
        &self,
        keys: &[impl AsRef<str>],
    ) -> Result<Vec<(String, Option<String>)>> {
        let material = self.active_key().await?;
        let keys = owned_keys(keys);
        let rows = self.map_call("multi_get", self.map.multi_get(&keys)).await?;

        let decrypted = join_all(rows.into_iter().map(|(key, stored)| async move {
            let Some(ciphertext) = stored else {
                return (key, None);
            };
            match self.decrypt(material, &ciphertext).await {
                Ok(plaintext) => (key, Some(plaintext)),
                Err(e) => {
                    warn!(key = %key, error = %e, "batch item failed to decrypt");
                    self.events.emit(StoreEvent::ItemDecryptFailed {
                        key: key.clone(),
                        reason: e.to_string(),
                    });
                    (key, None)
                }
            }
        }))
        .await;

        Ok(decrypted)
    }

    /// Like [`try_multi_get`](Self::try_multi_get); a failure of the whole
    /// batch resolves every requested key to `None`.
    pub async fn multi_get(&self, keys: &[impl AsRef<str>]) -> Vec<(String, Option<String>)> {
        match self.try_multi_get(keys).await {
            Ok(rows) => rows,
            Err(e) => {
                let empty: Vec<_> = owned_keys(keys).into_iter().map(|k| (k, None)).collect();
                self.degrade("multi_get", e, empty)
            }
        }
    }

    /// Encrypt every value, then write them in one map batch.
    ///
    /// No write happens unless every value encrypted successfully.
    pub async fn multi_set(&self, pairs: &[(impl AsRef<str>, impl AsRef<str>)]) -> Result<()> {
        let material = self.active_key().await?;
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        let encrypted = self.encrypt_all(material, pairs).await?;
        self.map_call("multi_set", self.map.multi_set(&encrypted))
            .await?;
        debug!(count = encrypted.len(), "batch written");
        Ok(())
    }

    pub async fn try_multi_remove(&self, keys: &[impl AsRef<str>]) -> Result<()> {
        let keys = owned_keys(keys);
        self.map_call("multi_remove", self.map.multi_remove(&keys))
            .await
    }

    pub async fn multi_remove(&self, keys: &[impl AsRef<str>]) {
        if let Err(e) = self.try_multi_remove(keys).await {
            self.degrade("multi_remove", e, ());
        }
    }

    /// Batched [`merge_item`](Self::merge_item): one batch read, one batch write.
    ///
    /// A key given more than once is merged in order, so later values
    /// override earlier ones. If any existing value cannot be decrypted the
    /// whole call fails and nothing is written.
    pub async fn multi_merge(&self, pairs: &[(impl AsRef<str>, impl AsRef<str>)]) -> Result<()> {
        let material = self.active_key().await?;

        let mut order: Vec<String> = Vec::new();
        for (key, _) in pairs {
            let key = key.as_ref();
            if !order.iter().any(|k| k == key) {
                order.push(key.to_string());
            }
        }

        let rows = self.map_call("multi_get", self.map.multi_get(&order)).await?;
        let existing = join_all(rows.into_iter().map(|(key, stored)| async move {
            match stored {
                Some(ciphertext) => self
                    .decrypt(material, &ciphertext)
                    .await
                    .map(|plaintext| (key, Some(plaintext))),
                None => Ok((key, None)),
            }
        }))
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

        let mut current: HashMap<String, Option<String>> = existing.into_iter().collect();
        for (key, value) in pairs {
            let slot = current.entry(key.as_ref().to_string()).or_default();
            let merged = merge_values(slot.as_deref(), value.as_ref());
            *slot = Some(merged);
        }

        let merged: Vec<(String, String)> = order
            .into_iter()
            .filter_map(|key| {
                let value = current.remove(&key).flatten()?;
                Some((key, value))
            })
            .collect();

        let encrypted = self.encrypt_all(material, merged).await?;
        self.map_call("multi_set", self.map.multi_set(&encrypted))
            .await?;
        debug!(count = encrypted.len(), "batch merged");
        Ok(())
    }

    // ---- helpers ----

    async fn active_key(&self) -> Result<&KeyMaterial> {
        match self.mode.slot() {
            Some(slot) => self.keys.resolve(slot).await,
            None => Err(StoreError::NoCipherConfigured),
        }
    }

    async fn encrypt(&self, material: &KeyMaterial, plaintext: &str) -> Result<String> {
        bounded(self.timeout, "encrypt", self.mode.encrypt(plaintext, material))
            .await?
            .map_err(StoreError::encrypt)
    }

    async fn decrypt(&self, material: &KeyMaterial, ciphertext: &str) -> Result<String> {
        bounded(self.timeout, "decrypt", self.mode.decrypt(ciphertext, material))
            .await?
            .map_err(StoreError::decrypt)
    }

    async fn encrypt_all(
        &self,
        material: &KeyMaterial,
        pairs: Vec<(String, String)>,
    ) -> Result<Vec<(String, String)>> {
        join_all(pairs.into_iter().map(|(key, value)| async move {
            self.encrypt(material, &value)
                .await
                .map(|ciphertext| (key, ciphertext))
        }))
        .await
        .into_iter()
        .collect()
    }

    async fn map_call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = sealkv_storage::Result<T>>,
    ) -> Result<T> {
        bounded(self.timeout, operation, fut)
            .await?
            .map_err(|e| StoreError::map(operation, e))
    }

    fn degrade<T>(&self, operation: &'static str, err: StoreError, fallback: T) -> T {
        warn!(operation, error = %err, "operation failed, returning empty result");
        self.events.emit(StoreEvent::Degraded {
            operation,
            reason: err.to_string(),
        });
        fallback
    }
}

fn owned_keys(keys: &[impl AsRef<str>]) -> Vec<String> {
    keys.iter().map(|k| k.as_ref().to_string()).collect()
}
