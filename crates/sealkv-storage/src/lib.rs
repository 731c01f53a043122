//! Persistent string-to-string maps for sealkv.
//!
//! Maps store opaque strings and know nothing about encryption. Batch
//! operations in both built-in maps apply under one lock and, for
//! [`FileMap`], one atomic file replacement.

pub mod error;
pub mod file;
pub mod memory;

use async_trait::async_trait;

pub use error::{MapError, Result};
pub use file::FileMap;
pub use memory::MemoryMap;

/// Async trait for persistent map backends.
#[async_trait]
pub trait PersistentMap: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// All stored keys, sorted.
    async fn get_all_keys(&self) -> Result<Vec<String>>;

    /// One entry per requested key, in request order.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>>;

    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<()>;

    async fn multi_remove(&self, keys: &[String]) -> Result<()>;
}
