//! Configuration loading and persistence.

use super::{Config, StorageBackend};
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Load from the default path, falling back to defaults when no file exists.
    ///
    /// Environment overrides are applied in both cases.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let mut config = match Self::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(path)) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `SEALKV_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(ms) = env::get_u64(env::vars::TIMEOUT_MS) {
            self.timeouts.operation_ms = Some(ms);
        }
        if let Some(path) = env::get_var(env::vars::DATA_PATH) {
            self.storage.path = Some(paths::expand_tilde(&path));
        }
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to a JSON5-compatible string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Vault service names
        if self.vault.symmetric_service.trim().is_empty() {
            errors.push("vault.symmetric_service must not be empty".to_string());
        }
        if self.vault.asymmetric_service.trim().is_empty() {
            errors.push("vault.asymmetric_service must not be empty".to_string());
        }
        if self.vault.symmetric_service == self.vault.asymmetric_service {
            errors.push(format!(
                "vault services must differ, both are '{}'",
                self.vault.symmetric_service
            ));
        }
        if self.vault.account.trim().is_empty() {
            errors.push("vault.account must not be empty".to_string());
        }

        // 2. Cipher capabilities
        if !self.cipher.symmetric && !self.cipher.asymmetric {
            errors.push("cipher: enable at least one of symmetric or asymmetric".to_string());
        }
        if self.cipher.symmetric && self.cipher.key_bits != 256 {
            errors.push(format!(
                "cipher.key_bits must be 256, got {}",
                self.cipher.key_bits
            ));
        }

        // 3. Timeouts
        if self.timeouts.operation_ms == Some(0) {
            errors.push("timeouts.operation_ms must be greater than 0".to_string());
        }

        // 4. Event buffer
        if self.events.capacity == 0 {
            errors.push("events.capacity must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Per-call timeout, if configured.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.timeouts.operation_ms.map(Duration::from_millis)
    }

    /// Resolve the data file for the file backend.
    ///
    /// Returns `None` for the memory backend.
    pub fn data_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        match self.storage.backend {
            StorageBackend::Memory => Ok(None),
            StorageBackend::File => match &self.storage.path {
                Some(path) => Ok(Some(paths::expand_tilde(&path.to_string_lossy()))),
                None => paths::data_file().map(Some),
            },
        }
    }
}
