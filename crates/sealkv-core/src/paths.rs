//! Path resolution utilities.

use crate::env;
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the sealkv base directory (~/.sealkv).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".sealkv"))
}

/// Get the config file path, honouring `SEALKV_CONFIG`.
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::get_var(env::vars::CONFIG) {
        return Ok(expand_tilde(&path));
    }
    Ok(base_dir()?.join("sealkv.json5"))
}

/// Get the default data file for the file-backed map (~/.sealkv/store.json).
pub fn data_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::get_var(env::vars::DATA_PATH) {
        return Ok(expand_tilde(&path));
    }
    Ok(base_dir()?.join("store.json"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
