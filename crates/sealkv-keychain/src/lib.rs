//! Credential vault adapters for sealkv.
//!
//! A vault holds one secret string per service name. sealkv reserves two
//! services: [`SYMMETRIC_SERVICE`] for the symmetric secret and
//! [`ASYMMETRIC_SERVICE`] for the JSON-encoded keypair.

pub mod error;
pub mod os;
pub mod memory;

use async_trait::async_trait;
use sealkv_core::SecretString;

pub use error::{Result, VaultError};
pub use os::KeyringVault;
pub use memory::MemoryVault;
pub use sealkv_core::config::{
    DEFAULT_ASYMMETRIC_SERVICE as ASYMMETRIC_SERVICE,
    DEFAULT_SYMMETRIC_SERVICE as SYMMETRIC_SERVICE,
};

/// Async trait for credential vault backends.
#[async_trait]
pub trait CredentialVault: Send + Sync {
    /// Read the secret stored under `service`. A missing entry is `Ok(None)`.
    async fn get_secret(&self, service: &str) -> Result<Option<SecretString>>;

    /// Create or replace the secret stored under `service`.
    async fn set_secret(&self, service: &str, secret: &SecretString) -> Result<()>;

    /// Remove the entry. Removing a missing entry succeeds.
    async fn delete_secret(&self, service: &str) -> Result<()>;
}
