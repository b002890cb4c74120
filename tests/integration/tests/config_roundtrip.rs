//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be serialized, written to disk,
//! loaded back, and turned into a working secret manager.

use std::path::Path;
use std::sync::Arc;

use keysafe_core::config::{CipherBackend, Config, DecryptFailureMode, KeySourceConfig};
use keysafe_core::OwnerId;
use keysafe_integration_tests::{fixture_config, TEST_HEX_KEY};
use keysafe_secrets::{FileSettingsStore, GatewayProvider, KeyOrigin, SecretManager};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keysafe.json5");

    let config = fixture_config(dir.path());
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.cipher.key, config.cipher.key);
    assert_eq!(loaded.storage.owners, config.storage.owners);
    assert_eq!(loaded.storage.dir, config.storage.dir);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_loaded_config_builds_working_manager() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keysafe.json5");
    fixture_config(dir.path()).save(&path).unwrap();

    let config = Config::load(&path).unwrap();
    let provider = GatewayProvider::new(config.cipher.clone());
    let store = Arc::new(FileSettingsStore::from_config(&config).unwrap());
    let manager = SecretManager::from_provider(&provider, store)
        .unwrap()
        .with_failure_policy(config.secrets.on_decrypt_failure);

    assert_eq!(provider.key_origin(), Some(KeyOrigin::Supplied));
    manager
        .save_secret(OwnerId::new(2), Some("sk-from-config"), Some("anthropic"))
        .unwrap();
    assert_eq!(
        manager.get_secret(OwnerId::new(2)).unwrap().unwrap().expose(),
        "sk-from-config"
    );
}

#[test]
fn test_env_key_source() {
    let var = "KEYSAFE_INTEGRATION_TEST_KEY";
    std::env::set_var(var, TEST_HEX_KEY);

    let config = Config::parse(&format!(
        r#"{{ cipher: {{ backend: "aes_gcm", key: {{ source: "env", var: "{var}" }} }} }}"#
    ))
    .unwrap();
    let provider = GatewayProvider::new(config.cipher.clone());
    let gateway = provider.get().unwrap();
    std::env::remove_var(var);

    let blob = gateway.encrypt("sk-env").unwrap();
    assert_eq!(gateway.decrypt(&blob).unwrap().expose_secret(), "sk-env");
    assert_eq!(provider.key_origin(), Some(KeyOrigin::Supplied));
}

#[test]
fn test_parsed_defaults() {
    let config = Config::parse("{}").unwrap();
    assert_eq!(config.cipher.backend, CipherBackend::AesGcm);
    assert_eq!(config.cipher.key, KeySourceConfig::Generated);
    assert_eq!(config.secrets.on_decrypt_failure, DecryptFailureMode::Absent);
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/keysafe.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}
