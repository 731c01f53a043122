//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Vault service holding the symmetric secret.
pub const DEFAULT_SYMMETRIC_SERVICE: &str = "encrypted_storage_key";

/// Vault service holding the JSON-encoded asymmetric keypair.
pub const DEFAULT_ASYMMETRIC_SERVICE: &str = "encrypted_rsa_storage_key";

/// Main sealkv configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Credential vault settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Persistent map settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cipher capabilities exposed to the store.
    #[serde(default)]
    pub cipher: CipherConfig,

    /// Timeouts for external calls.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Event channel settings.
    #[serde(default)]
    pub events: EventsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Credential vault backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultBackend {
    /// OS credential store (Keychain, Secret Service, Credential Manager).
    #[default]
    Keyring,
    /// Process-local map. Keys do not survive a restart.
    Memory,
}

/// Credential vault configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub backend: VaultBackend,

    /// Account name used for keyring entries.
    #[serde(default = "default_account")]
    pub account: String,

    /// Service name of the symmetric secret entry.
    #[serde(default = "default_symmetric_service")]
    pub symmetric_service: String,

    /// Service name of the asymmetric keypair entry.
    #[serde(default = "default_asymmetric_service")]
    pub asymmetric_service: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            backend: VaultBackend::default(),
            account: default_account(),
            symmetric_service: default_symmetric_service(),
            asymmetric_service: default_asymmetric_service(),
        }
    }
}

fn default_account() -> String {
    "sealkv".to_string()
}

fn default_symmetric_service() -> String {
    DEFAULT_SYMMETRIC_SERVICE.to_string()
}

fn default_asymmetric_service() -> String {
    DEFAULT_ASYMMETRIC_SERVICE.to_string()
}

/// Persistent map backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file with atomic writes.
    #[default]
    File,
    /// Process-local map.
    Memory,
}

/// Persistent map configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Data file for the file backend. Defaults to `~/.sealkv/store.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Cipher capability configuration.
///
/// When both capabilities are enabled the store runs in symmetric mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherConfig {
    /// Expose the AES-256-GCM capability.
    #[serde(default = "default_true")]
    pub symmetric: bool,

    /// Expose the X25519 sealed-box capability.
    #[serde(default)]
    pub asymmetric: bool,

    /// Register async twins for the enabled capabilities.
    #[serde(default = "default_true")]
    pub async_primitives: bool,

    /// Symmetric key size in bits.
    #[serde(default = "default_key_bits")]
    pub key_bits: u32,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            symmetric: true,
            asymmetric: false,
            async_primitives: true,
            key_bits: default_key_bits(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_key_bits() -> u32 {
    256
}

/// Timeout configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Upper bound for each vault, cipher, and map call. Unset means no bound.
    ///
    /// A vault read that exceeds it is treated as a missing key, and a new
    /// key then overwrites the stored one. With the keyring vault, keep it
    /// well above the time an OS unlock prompt may take.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_ms: Option<u64>,
}

/// Event channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Broadcast buffer size. Slow subscribers lag past this many events.
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

fn default_event_capacity() -> usize {
    256
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "sealkv=info".to_string()
}
