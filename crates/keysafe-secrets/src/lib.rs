//! Encrypted per-owner API key storage for Keysafe.
//!
//! Plaintext keys are sealed with AES-256-GCM under a single process key and
//! only the resulting `nonce || ciphertext || tag` blob is persisted.
//! [`SecretManager`] is the entry point; everything else is plumbing it is
//! built from.

pub mod crypto;
pub mod error;
pub mod field;
pub mod file;
pub mod key;
pub mod manager;
pub mod provider;
pub mod store;
pub mod types;

pub use crypto::{AesGcmGateway, CipherGateway};
pub use error::{Result, SecretError};
pub use field::EncryptedField;
pub use file::FileSettingsStore;
pub use key::{KeyOrigin, SymmetricKey};
pub use manager::{DecryptFailurePolicy, SecretLookup, SecretManager};
pub use provider::GatewayProvider;
pub use store::{MemorySettingsStore, OwnerRegistry, SettingsStore};
pub use types::{DecryptedSecret, UserSettings};
