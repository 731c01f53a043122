//! End-to-end store behaviour across the crates.
//!
//! A restart is simulated by dropping a store and building a new one over the
//! same map file and a clone of the same vault.

use std::sync::Arc;

use sealkv::{CipherProvider, CredentialVault, KeyPair, KeySlot, MemoryVault, ModeKind};
use sealkv_integration_tests::file_store;
use tempfile::TempDir;

#[tokio::test]
async fn test_set_get_and_batches() {
    let tmp = TempDir::new().unwrap();
    let vault = MemoryVault::new();
    let store = file_store(&vault, CipherProvider::aes_gcm(), &tmp.path().join("store.json"));

    store.set_item("x", "hello").await.unwrap();
    assert_eq!(store.get_item("x").await.as_deref(), Some("hello"));
    assert_eq!(store.get_item("missing").await, None);

    store.multi_set(&[("x", "1"), ("y", "2")]).await.unwrap();
    assert_eq!(
        store.multi_get(&["x", "y", "z"]).await,
        vec![
            ("x".to_string(), Some("1".to_string())),
            ("y".to_string(), Some("2".to_string())),
            ("z".to_string(), None),
        ]
    );
}

#[tokio::test]
async fn test_values_survive_restart() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    let vault = MemoryVault::new();

    let store = file_store(&vault, CipherProvider::aes_gcm(), &path);
    store.set_item("token", "s3cr3t").await.unwrap();
    store.merge_item("profile", r#"{"name":"ada"}"#).await.unwrap();
    let key_before = store.key_manager().symmetric_key().await.unwrap();
    drop(store);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("s3cr3t"));
    assert!(!raw.contains("ada"));

    let restarted = file_store(&vault, CipherProvider::aes_gcm(), &path);
    assert_eq!(restarted.get_item("token").await.as_deref(), Some("s3cr3t"));
    restarted
        .merge_item("profile", r#"{"lang":"en"}"#)
        .await
        .unwrap();
    assert_eq!(
        restarted.get_item("profile").await.as_deref(),
        Some(r#"{"name":"ada","lang":"en"}"#)
    );

    assert_eq!(restarted.key_manager().symmetric_key().await.unwrap(), key_before);
    assert_eq!(vault.len().await, 1);
}

#[tokio::test]
async fn test_asymmetric_store_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    let vault = MemoryVault::new();

    let store = file_store(&vault, CipherProvider::sealed_box(), &path);
    assert_eq!(store.mode(), ModeKind::AsymmetricAsync);
    store
        .multi_merge(&[("a", r#"{"n":1}"#), ("b", "plain")])
        .await
        .unwrap();
    drop(store);

    let entry = vault
        .get_secret(sealkv_core::config::DEFAULT_ASYMMETRIC_SERVICE)
        .await
        .unwrap()
        .unwrap();
    let pair = KeyPair::from_vault_secret(&entry).unwrap();
    assert!(!pair.public_key.is_empty());

    let restarted = file_store(&vault, CipherProvider::sealed_box().without_async(), &path);
    assert_eq!(
        restarted.multi_get(&["a", "b"]).await,
        vec![
            ("a".to_string(), Some(r#"{"n":1}"#.to_string())),
            ("b".to_string(), Some("plain".to_string())),
        ]
    );
    assert_eq!(restarted.key_manager().active_slot(), Some(KeySlot::Asymmetric));
}

#[tokio::test]
async fn test_concurrent_first_writes_share_one_key() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    let vault = MemoryVault::new();
    let store = Arc::new(file_store(&vault, CipherProvider::aes_gcm(), &path));

    let writers: Vec<_> = (0..12)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .set_item(&format!("k{i}"), &format!("v{i}"))
                    .await
                    .unwrap();
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap();
    }
    drop(store);

    // every value must decrypt with the one key that reached the vault
    let restarted = file_store(&vault, CipherProvider::aes_gcm(), &path);
    for i in 0..12 {
        assert_eq!(
            restarted.try_get_item(&format!("k{i}")).await.unwrap(),
            Some(format!("v{i}"))
        );
    }
    assert_eq!(vault.len().await, 1);
}

#[tokio::test]
async fn test_preexisting_vault_key_is_used() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    let vault = MemoryVault::new();

    let seeded = CipherProvider::aes_gcm().generate_symmetric_key(256).unwrap();
    vault
        .set_secret(sealkv_core::config::DEFAULT_SYMMETRIC_SERVICE, &seeded)
        .await
        .unwrap();

    let store = file_store(&vault, CipherProvider::aes_gcm(), &path);
    store.set_item("x", "hello").await.unwrap();
    assert_eq!(store.key_manager().symmetric_key().await.unwrap(), seeded);

    // replacing the vault entry makes old ciphertexts undecryptable, loudly
    let replacement = CipherProvider::aes_gcm().generate_symmetric_key(256).unwrap();
    vault
        .set_secret(sealkv_core::config::DEFAULT_SYMMETRIC_SERVICE, &replacement)
        .await
        .unwrap();
    let other = file_store(&vault, CipherProvider::aes_gcm(), &path);
    assert!(other.try_get_item("x").await.is_err());
    assert_eq!(other.get_item("x").await, None);
}
