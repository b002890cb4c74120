//! Configuration schema definitions.

use crate::id::OwnerId;
use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Keysafe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Cipher gateway settings.
    #[serde(default)]
    pub cipher: CipherConfig,

    /// Settings-record storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Secret retrieval behavior.
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cipher gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CipherConfig {
    /// Which gateway implementation to build.
    #[serde(default)]
    pub backend: CipherBackend,

    /// Where the symmetric key comes from.
    #[serde(default)]
    pub key: KeySourceConfig,
}

/// Cipher gateway implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherBackend {
    /// Local AES-256-GCM with the configured key.
    #[default]
    AesGcm,
    /// Key-management-service backed gateway (not available yet).
    Kms,
}

impl CipherBackend {
    /// Stable name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AesGcm => "aes_gcm",
            Self::Kms => "kms",
        }
    }
}

/// Source of the 32-byte symmetric key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum KeySourceConfig {
    /// Random key generated at startup and never persisted.
    ///
    /// Only suitable for development and tests: every restart makes
    /// previously stored secrets unreadable.
    #[default]
    Generated,

    /// Hex-encoded key inline in the config file.
    Hex { value: SecretString },

    /// Hex-encoded key read from the named environment variable.
    Env { var: String },

    /// Hex-encoded key read from a file.
    File { path: PathBuf },
}

impl KeySourceConfig {
    /// Whether the key is supplied from outside the process.
    pub fn is_external(&self) -> bool {
        !matches!(self, Self::Generated)
    }
}

/// Settings-record storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one record file per owner.
    ///
    /// Defaults to `~/.keysafe/settings`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Owner ids the store accepts.
    #[serde(default)]
    pub owners: Vec<OwnerId>,
}

/// Secret retrieval configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// What a read does when the stored blob fails to decrypt.
    #[serde(default)]
    pub on_decrypt_failure: DecryptFailureMode,
}

/// Handling of undecryptable stored secrets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecryptFailureMode {
    /// Report the secret as not set.
    #[default]
    Absent,
    /// Return the decryption error to the caller.
    Propagate,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string for an env-filter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// One level more verbose, saturating at trace.
    pub fn more_verbose(self) -> Self {
        match self {
            Self::Error => Self::Warn,
            Self::Warn => Self::Info,
            Self::Info => Self::Debug,
            Self::Debug | Self::Trace => Self::Trace,
        }
    }
}
