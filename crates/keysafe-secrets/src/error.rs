//! Error types for secret management.

use keysafe_core::OwnerId;
use thiserror::Error;

/// Errors that can occur during secret operations.
///
/// `MalformedCiphertext` and `DecryptionFailed` render the same message so a
/// caller cannot tell a truncated blob from a forged one. Match on the
/// variant internally when the distinction matters.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decryption failed")]
    MalformedCiphertext { len: usize },

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Owner not found: {0}")]
    OwnerNotFound(OwnerId),

    #[error("Key source error: {0}")]
    KeySource(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SecretError {
    /// Whether this error means a stored blob could not be turned back into plaintext.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedCiphertext { .. } | Self::DecryptionFailed
        )
    }
}

/// Convenience result alias for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;
