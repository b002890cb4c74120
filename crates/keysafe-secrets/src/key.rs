//! Symmetric key material and key source resolution.
//!
//! The key is resolved from the explicit [`KeySourceConfig`] passed at
//! startup:
//! 1. `hex`: inline hex string in the config file
//! 2. `env`: hex string in the named environment variable
//! 3. `file`: hex string in a file
//! 4. `generated`: fresh random key, never persisted (bootstrap only)

use std::fmt;

use keysafe_core::config::KeySourceConfig;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, SecretError};

/// Length of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// A 256-bit symmetric key, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    /// Generate a new random key from the OS RNG.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Build a key from exactly [`KEY_LEN`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LEN {
            return Err(SecretError::KeySource(format!(
                "key must be exactly {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Decode a hex-encoded key.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(hex_key.trim())
                .map_err(|e| SecretError::KeySource(format!("invalid hex key: {e}")))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Encode as lowercase hex, suitable for `cipher.key.source = "hex"`.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Generated in-process; secrets sealed with it die with the process.
    Generated,
    /// Supplied from outside the process.
    Supplied,
}

/// Resolve the key described by `source`.
pub fn resolve(source: &KeySourceConfig) -> Result<(SymmetricKey, KeyOrigin)> {
    match source {
        KeySourceConfig::Generated => {
            debug!("generating ephemeral symmetric key");
            Ok((SymmetricKey::generate(), KeyOrigin::Generated))
        }
        KeySourceConfig::Hex { value } => {
            debug!("using symmetric key from config");
            let key = SymmetricKey::from_hex(value.expose_secret())?;
            Ok((key, KeyOrigin::Supplied))
        }
        KeySourceConfig::Env { var } => {
            debug!(var = %var, "using symmetric key from environment variable");
            let value = Zeroizing::new(std::env::var(var).map_err(|e| {
                SecretError::KeySource(format!("cannot read {var}: {e}"))
            })?);
            let key = SymmetricKey::from_hex(&value)
                .map_err(|e| SecretError::KeySource(format!("{var}: {e}")))?;
            Ok((key, KeyOrigin::Supplied))
        }
        KeySourceConfig::File { path } => {
            debug!(path = %path.display(), "using symmetric key from file");
            let value = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
                SecretError::KeySource(format!("cannot read {}: {e}", path.display()))
            })?);
            let key = SymmetricKey::from_hex(&value)
                .map_err(|e| SecretError::KeySource(format!("{}: {e}", path.display())))?;
            Ok((key, KeyOrigin::Supplied))
        }
    }
}
