//! Save and retrieve per-owner API keys.
//!
//! [`SecretManager`] is the only entry point application code should use. It
//! resolves the owner's record through a [`SettingsStore`], seals or opens the
//! key with a [`CipherGateway`], and persists the result.

use std::sync::Arc;

use keysafe_core::config::DecryptFailureMode;
use keysafe_core::OwnerId;
use tracing::{debug, warn};

use crate::crypto::CipherGateway;
use crate::error::{Result, SecretError};
use crate::field::EncryptedField;
use crate::provider::GatewayProvider;
use crate::store::SettingsStore;
use crate::types::{DecryptedSecret, UserSettings};

/// How [`SecretManager::get_secret`] reports an undecryptable stored key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecryptFailurePolicy {
    /// Return `None`, as if no key was set.
    #[default]
    TreatAsAbsent,
    /// Return the decryption error.
    Propagate,
}

impl From<DecryptFailureMode> for DecryptFailurePolicy {
    fn from(mode: DecryptFailureMode) -> Self {
        match mode {
            DecryptFailureMode::Absent => Self::TreatAsAbsent,
            DecryptFailureMode::Propagate => Self::Propagate,
        }
    }
}

/// Outcome of reading an owner's key.
#[derive(Debug)]
pub enum SecretLookup {
    /// A non-empty key was stored and decrypted.
    Found(DecryptedSecret),
    /// No record, no blob, or an empty key.
    Absent,
    /// A blob is stored but could not be decrypted.
    Failed(SecretError),
}

impl SecretLookup {
    /// The secret, treating failure as absence.
    pub fn found(self) -> Option<DecryptedSecret> {
        match self {
            Self::Found(secret) => Some(secret),
            Self::Absent | Self::Failed(_) => None,
        }
    }
}

/// Encrypts, stores, and recovers owners' API keys.
pub struct SecretManager {
    gateway: Arc<dyn CipherGateway>,
    store: Arc<dyn SettingsStore>,
    policy: DecryptFailurePolicy,
}

impl SecretManager {
    /// Create a manager with the default failure policy.
    pub fn new(gateway: Arc<dyn CipherGateway>, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            gateway,
            store,
            policy: DecryptFailurePolicy::default(),
        }
    }

    /// Create a manager using the provider's gateway.
    pub fn from_provider(provider: &GatewayProvider, store: Arc<dyn SettingsStore>) -> Result<Self> {
        Ok(Self::new(provider.get()?, store))
    }

    /// Override how undecryptable keys are reported.
    pub fn with_failure_policy(mut self, policy: impl Into<DecryptFailurePolicy>) -> Self {
        self.policy = policy.into();
        self
    }

    pub fn failure_policy(&self) -> DecryptFailurePolicy {
        self.policy
    }

    /// Encrypt and store `api_key` for `owner`.
    ///
    /// The record is created on first use. `None` leaves the stored key
    /// untouched; `Some("")` stores the empty sentinel, which reads back as
    /// not set. A `None` or empty `api_provider` leaves the label untouched.
    pub fn save_secret(
        &self,
        owner: OwnerId,
        api_key: Option<&str>,
        api_provider: Option<&str>,
    ) -> Result<UserSettings> {
        let mut settings = self.store.get_or_create(owner)?;

        if let Some(api_key) = api_key {
            let field = EncryptedField::seal(self.gateway.as_ref(), api_key)?;
            debug!(owner_id = %owner, len = field.len(), "sealed api key");
            settings.set_encrypted_api_key(field);
        }

        if let Some(provider) = api_provider.filter(|p| !p.is_empty()) {
            settings.api_provider = Some(provider.to_string());
        }

        self.store.save(settings)
    }

    /// Read `owner`'s key, reporting decryption failure explicitly.
    ///
    /// Store errors are returned as `Err`; only decryption problems become
    /// [`SecretLookup::Failed`].
    pub fn lookup_secret(&self, owner: OwnerId) -> Result<SecretLookup> {
        let Some(settings) = self.store.find(owner)? else {
            return Ok(SecretLookup::Absent);
        };

        let field = settings.encrypted_api_key();
        if field.is_unset() {
            return Ok(SecretLookup::Absent);
        }

        match field.open(self.gateway.as_ref()) {
            Ok(plaintext) if plaintext.is_empty() => Ok(SecretLookup::Absent),
            Ok(plaintext) => Ok(SecretLookup::Found(plaintext.into())),
            Err(e) if e.is_decryption_failure() => {
                warn!(owner_id = %owner, len = field.len(), "stored api key could not be decrypted");
                Ok(SecretLookup::Failed(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Read `owner`'s key, applying the failure policy.
    ///
    /// `Ok(None)` means no usable key: no record, never set, empty, or (with
    /// [`DecryptFailurePolicy::TreatAsAbsent`]) undecryptable.
    pub fn get_secret(&self, owner: OwnerId) -> Result<Option<DecryptedSecret>> {
        match self.lookup_secret(owner)? {
            SecretLookup::Found(secret) => Ok(Some(secret)),
            SecretLookup::Absent => Ok(None),
            SecretLookup::Failed(e) => match self.policy {
                DecryptFailurePolicy::TreatAsAbsent => {
                    debug!(owner_id = %owner, "treating undecryptable api key as absent");
                    Ok(None)
                }
                DecryptFailurePolicy::Propagate => Err(e),
            },
        }
    }
}
