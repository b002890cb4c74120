//! Core types for secret management.
//!
//! [`UserSettings`] is the per-owner record the settings store persists.
//! [`DecryptedSecret`] is the in-memory plaintext handed back to callers.

use chrono::{DateTime, Utc};
use keysafe_core::{OwnerId, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SecretError};
use crate::field::EncryptedField;

/// Maximum length of the provider label, in characters.
pub const MAX_PROVIDER_LEN: usize = 50;

/// One owner's settings record.
///
/// The encrypted API key has no public setter: only
/// [`crate::SecretManager::save_secret`] writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    /// Owner of this record.
    pub owner_id: OwnerId,

    /// `nonce || ciphertext || tag`, or null when never saved.
    #[serde(default)]
    api_key_encrypted: EncryptedField,

    /// Which API the key belongs to (e.g. "openai"). Stored in plaintext.
    #[serde(default)]
    pub api_provider: Option<String>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last saved.
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    /// A fresh record with no secret and no provider.
    pub fn new(owner_id: OwnerId) -> Self {
        let now = Utc::now();
        Self {
            owner_id,
            api_key_encrypted: EncryptedField::null(),
            api_provider: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The stored ciphertext.
    pub fn encrypted_api_key(&self) -> &EncryptedField {
        &self.api_key_encrypted
    }

    pub(crate) fn set_encrypted_api_key(&mut self, field: EncryptedField) {
        self.api_key_encrypted = field;
    }

    /// Check field constraints before persisting.
    pub fn validate(&self) -> Result<()> {
        if let Some(provider) = &self.api_provider {
            let len = provider.chars().count();
            if len > MAX_PROVIDER_LEN {
                return Err(SecretError::Validation(format!(
                    "api_provider exceeds maximum length of {MAX_PROVIDER_LEN} characters (got {len})"
                )));
            }
        }
        Ok(())
    }
}

/// A decrypted secret held in memory.
///
/// Wraps `SecretString` so the plaintext is zeroed on drop. Debug and Display
/// both emit `[REDACTED]` to prevent accidental logging.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptedSecret {
    inner: SecretString,
}

impl DecryptedSecret {
    /// Create a new decrypted secret from raw plaintext.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::new(value),
        }
    }

    /// Expose the plaintext value. Use sparingly.
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl fmt::Debug for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<SecretString> for DecryptedSecret {
    fn from(inner: SecretString) -> Self {
        Self { inner }
    }
}
