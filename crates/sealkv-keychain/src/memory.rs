//! In-process vault.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sealkv_core::SecretString;
use tokio::sync::RwLock;

use crate::{CredentialVault, Result};

/// Vault backed by a shared map.
///
/// Clones share the same entries, so two stores built from clones behave
/// like two processes talking to one OS vault.
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    entries: Arc<RwLock<HashMap<String, SecretString>>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialVault for MemoryVault {
    async fn get_secret(&self, service: &str) -> Result<Option<SecretString>> {
        Ok(self.entries.read().await.get(service).cloned())
    }

    async fn set_secret(&self, service: &str, secret: &SecretString) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(service.to_string(), secret.clone());
        Ok(())
    }

    async fn delete_secret(&self, service: &str) -> Result<()> {
        self.entries.write().await.remove(service);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let vault = MemoryVault::new();
        assert!(vault.get_secret("svc").await.unwrap().is_none());

        vault.set_secret("svc", &SecretString::new("v1")).await.unwrap();
        vault.set_secret("svc", &SecretString::new("v2")).await.unwrap();
        assert_eq!(
            vault.get_secret("svc").await.unwrap(),
            Some(SecretString::new("v2"))
        );
        assert_eq!(vault.len().await, 1);

        vault.delete_secret("svc").await.unwrap();
        vault.delete_secret("svc").await.unwrap();
        assert!(vault.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let vault = MemoryVault::new();
        let other = vault.clone();
        vault.set_secret("svc", &SecretString::new("shared")).await.unwrap();
        assert_eq!(
            other.get_secret("svc").await.unwrap(),
            Some(SecretString::new("shared"))
        );
    }
}
