//! Runtime options for a store, derived from [`Config`].

use std::time::Duration;

use sealkv_core::config::{DEFAULT_ASYMMETRIC_SERVICE, DEFAULT_SYMMETRIC_SERVICE};
use sealkv_core::Config;
use sealkv_crypto::KeySlot;

/// Options shared by the key manager and the store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Vault service of the symmetric secret.
    pub symmetric_service: String,
    /// Vault service of the JSON-encoded keypair.
    pub asymmetric_service: String,
    /// Size of generated symmetric keys.
    pub key_bits: u32,
    /// Bound on each vault, cipher, and map call.
    pub timeout: Option<Duration>,
    /// Event channel buffer.
    pub event_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            symmetric_service: DEFAULT_SYMMETRIC_SERVICE.to_string(),
            asymmetric_service: DEFAULT_ASYMMETRIC_SERVICE.to_string(),
            key_bits: 256,
            timeout: None,
            event_capacity: 256,
        }
    }
}

impl StoreOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            symmetric_service: config.vault.symmetric_service.clone(),
            asymmetric_service: config.vault.asymmetric_service.clone(),
            key_bits: config.cipher.key_bits,
            timeout: config.operation_timeout(),
            event_capacity: config.events.capacity,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Vault service holding the key for `slot`.
    pub fn service(&self, slot: KeySlot) -> &str {
        match slot {
            KeySlot::Symmetric => &self.symmetric_service,
            KeySlot::Asymmetric => &self.asymmetric_service,
        }
    }
}
