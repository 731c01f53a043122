//! Environment variable handling.

use std::env;

/// Environment variable names recognised by sealkv.
pub mod vars {
    /// Overrides the config file location.
    pub const CONFIG: &str = "SEALKV_CONFIG";
    /// Overrides the data file used by the file-backed map.
    pub const DATA_PATH: &str = "SEALKV_DATA";
    /// Overrides the per-call timeout, in milliseconds.
    pub const TIMEOUT_MS: &str = "SEALKV_TIMEOUT_MS";
}

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable parsed as `u64`.
pub fn get_u64(name: &str) -> Option<u64> {
    get_var(name).and_then(|v| v.trim().parse().ok())
}
