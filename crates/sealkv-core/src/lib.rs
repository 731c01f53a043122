//! # sealkv-core
//!
//! Shared building blocks for the sealkv crates:
//!
//! - **Configuration**: JSON5 config loading, validation, and persistence
//! - **Secrets**: [`SecretString`], a zero-on-drop string for key material
//! - **Utilities**: path resolution and environment lookups

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

pub use config::Config;
pub use error::{ConfigError, Result};
pub use secret::SecretString;
