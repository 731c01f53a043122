//! OS credential store via the `keyring` crate.
//!
//! Dispatches to the macOS Keychain, the Secret Service on Linux, or the
//! Windows Credential Manager. Every call blocks, so each one runs on the
//! blocking pool.

use async_trait::async_trait;
use sealkv_core::SecretString;
use tracing::debug;

use crate::{CredentialVault, Result, VaultError};

/// Vault backed by the platform credential store.
///
/// Entries are addressed by `(service, account)`; the account is fixed per
/// vault instance.
#[derive(Debug, Clone)]
pub struct KeyringVault {
    account: String,
}

impl KeyringVault {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

#[async_trait]
impl CredentialVault for KeyringVault {
    async fn get_secret(&self, service: &str) -> Result<Option<SecretString>> {
        let service = service.to_string();
        let account = self.account.clone();
        tokio::task::spawn_blocking(move || {
            let read_err = |e: ::keyring::Error| VaultError::Read {
                service: service.clone(),
                reason: e.to_string(),
            };
            let entry = ::keyring::Entry::new(&service, &account).map_err(read_err)?;
            match entry.get_password() {
                Ok(secret) => {
                    debug!(service = %service, "read vault entry");
                    Ok(Some(SecretString::new(secret)))
                }
                Err(::keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(read_err(e)),
            }
        })
        .await
        .map_err(|e| VaultError::Task(e.to_string()))?
    }

    async fn set_secret(&self, service: &str, secret: &SecretString) -> Result<()> {
        let service = service.to_string();
        let account = self.account.clone();
        let secret = secret.clone();
        tokio::task::spawn_blocking(move || {
            let write_err = |e: ::keyring::Error| VaultError::Write {
                service: service.clone(),
                reason: e.to_string(),
            };
            let entry = ::keyring::Entry::new(&service, &account).map_err(write_err)?;
            entry
                .set_password(secret.expose_secret())
                .map_err(write_err)?;
            debug!(service = %service, "wrote vault entry");
            Ok(())
        })
        .await
        .map_err(|e| VaultError::Task(e.to_string()))?
    }

    async fn delete_secret(&self, service: &str) -> Result<()> {
        let service = service.to_string();
        let account = self.account.clone();
        tokio::task::spawn_blocking(move || {
            let delete_err = |e: ::keyring::Error| VaultError::Delete {
                service: service.clone(),
                reason: e.to_string(),
            };
            let entry = ::keyring::Entry::new(&service, &account).map_err(delete_err)?;
            match entry.delete_password() {
                Ok(()) | Err(::keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(delete_err(e)),
            }
        })
        .await
        .map_err(|e| VaultError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_is_kept() {
        let vault = KeyringVault::new("sealkv-test");
        assert_eq!(vault.account(), "sealkv-test");
    }
}
