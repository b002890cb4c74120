//! Stored layout of an encrypted API key.
//!
//! ```text
//! [0..12)   nonce
//! [12..)    AES-256-GCM ciphertext || 16-byte tag
//! ```
//!
//! A zero-length blob is the sentinel produced by encrypting `""`. A missing
//! value (`None`) means nothing was ever saved. Both read back as "not set".

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use keysafe_core::SecretString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::CipherGateway;
use crate::error::{Result, SecretError};

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Length of the blob produced for a plaintext of `plaintext_len` bytes.
pub const fn sealed_len(plaintext_len: usize) -> usize {
    if plaintext_len == 0 {
        0
    } else {
        NONCE_LEN + plaintext_len + TAG_LEN
    }
}

/// Split a non-empty blob into `(nonce, ciphertext_with_tag)`.
pub fn split(blob: &[u8]) -> Result<(&[u8], &[u8])> {
    if blob.len() < NONCE_LEN {
        return Err(SecretError::MalformedCiphertext { len: blob.len() });
    }
    Ok(blob.split_at(NONCE_LEN))
}

/// Concatenate a nonce and its sealed payload.
pub fn join(nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
    blob.extend_from_slice(nonce);
    blob.extend_from_slice(sealed);
    blob
}

/// Nullable binary column holding an encrypted API key.
///
/// Serialized as a base64 string, or `null` when never set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EncryptedField(Option<Vec<u8>>);

impl EncryptedField {
    /// A field that has never been written.
    pub fn null() -> Self {
        Self(None)
    }

    /// Wrap a blob read from storage.
    pub fn from_blob(blob: Vec<u8>) -> Self {
        Self(Some(blob))
    }

    /// Encrypt `plaintext` into a new field value.
    pub fn seal(gateway: &dyn CipherGateway, plaintext: &str) -> Result<Self> {
        gateway.encrypt(plaintext).map(Self::from_blob)
    }

    /// Decrypt the stored blob.
    ///
    /// Fails with [`SecretError::InvalidInput`] on a null field.
    pub fn open(&self, gateway: &dyn CipherGateway) -> Result<SecretString> {
        gateway.decrypt_opt(self.as_bytes())
    }

    /// The stored bytes, if any.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }

    /// True when the column is null.
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// True when null or zero-length.
    pub fn is_unset(&self) -> bool {
        self.0.as_ref().map_or(true, Vec::is_empty)
    }

    /// Blob length; zero when null.
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, Vec::len)
    }

    /// True for a null or zero-length blob.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Ciphertext is opaque; only its size is useful in logs
impl fmt::Debug for EncryptedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("EncryptedField(null)"),
            Some(blob) => write!(f, "EncryptedField({} bytes)", blob.len()),
        }
    }
}

impl Serialize for EncryptedField {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            None => serializer.serialize_none(),
            Some(blob) => serializer.serialize_some(&STANDARD.encode(blob)),
        }
    }
}

impl<'de> Deserialize<'de> for EncryptedField {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Self(None)),
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map(|blob| Self(Some(blob)))
                .map_err(|e| serde::de::Error::custom(format!("invalid base64 blob: {e}"))),
        }
    }
}
