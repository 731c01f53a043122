//! Config save/load roundtrip and config-driven store wiring.

use std::path::Path;

use sealkv::{ModeKind, StoreError};
use sealkv_core::config::{Config, StorageBackend, VaultBackend};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sealkv.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.vault.symmetric_service, config.vault.symmetric_service);
    assert_eq!(loaded.vault.asymmetric_service, config.vault.asymmetric_service);
    assert_eq!(loaded.cipher.key_bits, config.cipher.key_bits);
    assert_eq!(loaded.events.capacity, config.events.capacity);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sealkv.json5");

    let mut config = Config::default();
    config.cipher.asymmetric = true;
    config.timeouts.operation_ms = Some(2_000);
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert!(loaded.cipher.asymmetric);
    assert_eq!(loaded.timeouts.operation_ms, Some(2_000));
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/sealkv.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json").is_err());
}

#[tokio::test]
async fn test_open_from_json5_file() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data.json");
    let path = dir.path().join("sealkv.json5");
    std::fs::write(
        &path,
        format!(
            r#"{{
                // keys stay in process for this test
                vault: {{ backend: "memory" }},
                storage: {{ backend: "file", path: {:?} }},
                cipher: {{ symmetric: false, asymmetric: true }},
            }}"#,
            data.to_string_lossy()
        ),
    )
    .unwrap();

    let config = sealkv_cli::load_config(Some(&path)).unwrap();
    assert_eq!(config.vault.backend, VaultBackend::Memory);
    assert_eq!(config.storage.backend, StorageBackend::File);

    let store = sealkv::open(&config).unwrap();
    assert_eq!(store.mode(), ModeKind::AsymmetricAsync);
    store.set_item("x", "hello").await.unwrap();
    assert!(data.exists());
}

#[test]
fn test_open_rejects_invalid_config() {
    let mut config = Config::default();
    config.vault.backend = VaultBackend::Memory;
    config.vault.asymmetric_service = config.vault.symmetric_service.clone();

    assert!(matches!(sealkv::open(&config), Err(StoreError::Config(_))));
}
