//! Shared fixtures for the sealkv integration tests.

use std::path::Path;
use std::sync::Arc;

use sealkv::{CipherProvider, EncryptedStore, FileMap, MemoryVault, StoreOptions};

/// A store over a file map at `path`, keyed by `vault`.
///
/// Building two of these from clones of one vault simulates a process
/// restart: the map file and the vault entries outlive the store.
pub fn file_store(vault: &MemoryVault, cipher: CipherProvider, path: &Path) -> EncryptedStore {
    let map = FileMap::open(path).expect("open file map");
    EncryptedStore::new(
        Arc::new(vault.clone()),
        cipher,
        Arc::new(map),
        StoreOptions::default(),
    )
}
