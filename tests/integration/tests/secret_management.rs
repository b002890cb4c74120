//! End-to-end secret management tests.
//!
//! These tests wire the configured gateway provider, the file settings store,
//! and the secret manager together the way an application would.

use std::fs;
use std::sync::Arc;

use keysafe_core::OwnerId;
use keysafe_integration_tests::fixture_config;
use keysafe_secrets::field::{NONCE_LEN, TAG_LEN};
use keysafe_secrets::{
    DecryptFailurePolicy, FileSettingsStore, GatewayProvider, SecretError, SecretLookup,
    SecretManager, SettingsStore,
};
use tempfile::TempDir;

struct Fixture {
    manager: SecretManager,
    store: Arc<FileSettingsStore>,
    provider: GatewayProvider,
    _tmp: TempDir,
}

fn fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let config = fixture_config(tmp.path());
    let provider = GatewayProvider::new(config.cipher.clone());
    let store = Arc::new(FileSettingsStore::from_config(&config).unwrap());
    let manager = SecretManager::from_provider(&provider, store.clone()).unwrap();
    Fixture {
        manager,
        store,
        provider,
        _tmp: tmp,
    }
}

#[test]
fn test_end_to_end_api_key_storage() {
    let f = fixture();
    let owner = OwnerId::new(42);

    let settings = f
        .manager
        .save_secret(owner, Some("sk-abcdef"), Some("openai"))
        .unwrap();
    assert_eq!(settings.api_provider.as_deref(), Some("openai"));

    let blob = settings.encrypted_api_key().as_bytes().unwrap();
    assert_eq!(blob.len(), NONCE_LEN + "sk-abcdef".len() + TAG_LEN);
    assert_ne!(blob, b"sk-abcdef");

    let secret = f.manager.get_secret(owner).unwrap().unwrap();
    assert_eq!(secret.expose(), "sk-abcdef");
}

#[test]
fn test_cross_owner_isolation() {
    let f = fixture();
    let (a, b) = (OwnerId::new(1), OwnerId::new(2));
    f.manager.save_secret(a, Some("sk-user1-api-key"), None).unwrap();
    f.manager.save_secret(b, Some("sk-user2-api-key"), None).unwrap();

    let key_a = f.manager.get_secret(a).unwrap().unwrap();
    let key_b = f.manager.get_secret(b).unwrap().unwrap();
    assert_eq!(key_a.expose(), "sk-user1-api-key");
    assert_eq!(key_b.expose(), "sk-user2-api-key");

    let blob_a = f.store.find(a).unwrap().unwrap();
    let blob_b = f.store.find(b).unwrap().unwrap();
    assert_ne!(blob_a.encrypted_api_key(), blob_b.encrypted_api_key());
}

#[test]
fn test_api_key_update() {
    let f = fixture();
    let owner = OwnerId::new(1);

    f.manager.save_secret(owner, Some("sk-initial-key"), None).unwrap();
    assert_eq!(
        f.manager.get_secret(owner).unwrap().unwrap().expose(),
        "sk-initial-key"
    );

    f.manager.save_secret(owner, Some("sk-updated-key"), None).unwrap();
    assert_eq!(
        f.manager.get_secret(owner).unwrap().unwrap().expose(),
        "sk-updated-key"
    );
    assert_eq!(f.store.list_owners().unwrap(), vec![owner]);
}

#[test]
fn test_record_file_holds_only_ciphertext() {
    let f = fixture();
    let owner = OwnerId::new(1);
    let secret = "this-is-a-very-secret-key";
    f.manager.save_secret(owner, Some(secret), None).unwrap();

    let path = f.store.base_dir().join("1.json");
    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains(secret));

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.get("api_key").is_none());
    assert!(value["api_key_encrypted"].is_string());

    // The stored blob still opens with the process gateway
    let gateway = f.provider.get().unwrap();
    let record = f.store.find(owner).unwrap().unwrap();
    let opened = record.encrypted_api_key().open(gateway.as_ref()).unwrap();
    assert_eq!(opened.expose_secret(), secret);
}

#[test]
fn test_empty_api_key_reads_as_absent() {
    let f = fixture();
    let owner = OwnerId::new(2);
    let settings = f.manager.save_secret(owner, Some(""), Some("empty")).unwrap();

    assert_eq!(settings.encrypted_api_key().len(), 0);
    assert!(!settings.encrypted_api_key().is_null());
    assert!(f.manager.get_secret(owner).unwrap().is_none());
}

#[test]
fn test_owner_without_record_is_absent() {
    let f = fixture();
    assert!(f.manager.get_secret(OwnerId::new(42)).unwrap().is_none());
    assert!(f.store.list_owners().unwrap().is_empty());
}

#[test]
fn test_unknown_owner_cannot_save() {
    let f = fixture();
    let result = f.manager.save_secret(OwnerId::new(999), Some("sk-x"), None);
    assert!(matches!(result, Err(SecretError::OwnerNotFound(id)) if id.get() == 999));
}

#[test]
fn test_secrets_survive_process_restart_with_supplied_key() {
    let tmp = TempDir::new().unwrap();
    let config = fixture_config(tmp.path());
    let owner = OwnerId::new(42);

    {
        let provider = GatewayProvider::new(config.cipher.clone());
        let store = Arc::new(FileSettingsStore::from_config(&config).unwrap());
        let manager = SecretManager::from_provider(&provider, store).unwrap();
        manager.save_secret(owner, Some("sk-persisted"), None).unwrap();
    }

    let provider = GatewayProvider::new(config.cipher.clone());
    let store = Arc::new(FileSettingsStore::from_config(&config).unwrap());
    let manager = SecretManager::from_provider(&provider, store).unwrap();
    assert_eq!(
        manager.get_secret(owner).unwrap().unwrap().expose(),
        "sk-persisted"
    );
}

#[test]
fn test_foreign_key_blob_is_reported_by_lookup() {
    let tmp = TempDir::new().unwrap();
    let mut config = fixture_config(tmp.path());
    let owner = OwnerId::new(1);

    let provider = GatewayProvider::new(config.cipher.clone());
    let store = Arc::new(FileSettingsStore::from_config(&config).unwrap());
    SecretManager::from_provider(&provider, store.clone())
        .unwrap()
        .save_secret(owner, Some("sk-abcdef"), None)
        .unwrap();

    // Same records, different process key
    config.cipher.key = Default::default();
    let other = GatewayProvider::new(config.cipher.clone());
    let manager = SecretManager::from_provider(&other, store.clone()).unwrap();

    assert!(matches!(
        manager.lookup_secret(owner).unwrap(),
        SecretLookup::Failed(SecretError::DecryptionFailed)
    ));
    assert!(manager.get_secret(owner).unwrap().is_none());

    let strict = SecretManager::from_provider(&other, store)
        .unwrap()
        .with_failure_policy(DecryptFailurePolicy::Propagate);
    let err = strict.get_secret(owner).unwrap_err();
    assert_eq!(err.to_string(), "Decryption failed");
}
