//! Transparent at-rest encryption for key-value stores.
//!
//! [`EncryptedStore`] wraps a [`PersistentMap`] so values are encrypted
//! before they are written and decrypted after they are read. The key is
//! owned by a [`KeyManager`]: it is resolved once per process from the
//! credential vault, or generated and persisted on first use.
//!
//! ```no_run
//! # async fn demo() -> sealkv::Result<()> {
//! let config = sealkv::Config::load_or_default()?;
//! let store = sealkv::open(&config)?;
//!
//! store.set_item("token", "s3cr3t").await?;
//! assert_eq!(store.get_item("token").await.as_deref(), Some("s3cr3t"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod keys;
pub mod merge;
pub mod open;
pub mod options;
pub mod store;
mod timeout;

pub use error::{Result, StoreError};
pub use events::{EventBus, StoreEvent};
pub use keys::KeyManager;
pub use open::{cipher_from_config, open};
pub use options::StoreOptions;
pub use store::EncryptedStore;

pub use sealkv_core::{Config, SecretString};
pub use sealkv_crypto::{CipherProvider, KeyMaterial, KeyPair, KeySlot, ModeKind};
pub use sealkv_keychain::{CredentialVault, KeyringVault, MemoryVault};
pub use sealkv_storage::{FileMap, MemoryMap, PersistentMap};
