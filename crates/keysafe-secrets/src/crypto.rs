//! AES-256-GCM cipher gateway.
//!
//! A fresh random nonce is generated for every encryption and prepended to
//! the ciphertext; see [`crate::field`] for the byte layout. No associated
//! data is bound, so blobs stay interchangeable with other implementations
//! of the same layout.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use keysafe_core::SecretString;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, error, warn};

use crate::error::{Result, SecretError};
use crate::field::{self, NONCE_LEN};
use crate::key::SymmetricKey;

/// Turns plaintext into self-authenticating blobs and back.
pub trait CipherGateway: Send + Sync {
    /// Encrypt `plaintext`. The empty string maps to an empty blob.
    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>>;

    /// Decrypt a blob produced by [`CipherGateway::encrypt`]. An empty blob
    /// maps to the empty string.
    fn decrypt(&self, blob: &[u8]) -> Result<SecretString>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Encrypt a value that may be missing.
    ///
    /// `None` is [`SecretError::InvalidInput`]; `Some("")` is not.
    fn encrypt_opt(&self, plaintext: Option<&str>) -> Result<Vec<u8>> {
        match plaintext {
            Some(plaintext) => self.encrypt(plaintext),
            None => Err(SecretError::InvalidInput(
                "plaintext to encrypt is missing".to_string(),
            )),
        }
    }

    /// Decrypt a value that may be missing.
    ///
    /// `None` is [`SecretError::InvalidInput`]; an empty blob is not.
    fn decrypt_opt(&self, blob: Option<&[u8]>) -> Result<SecretString> {
        match blob {
            Some(blob) => self.decrypt(blob),
            None => Err(SecretError::InvalidInput(
                "ciphertext to decrypt is missing".to_string(),
            )),
        }
    }
}

/// [`CipherGateway`] backed by AES-256-GCM with a single process key.
pub struct AesGcmGateway {
    cipher: Aes256Gcm,
}

impl AesGcmGateway {
    /// Build a gateway around `key`.
    pub fn new(key: &SymmetricKey) -> Self {
        debug!("AES-GCM gateway initialized");
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }

    /// Build a gateway around a freshly generated key.
    ///
    /// Anything sealed by it is lost once the gateway is dropped.
    pub fn generated() -> Self {
        warn!("AES-GCM gateway using a generated key; do not use in production");
        Self::new(&SymmetricKey::generate())
    }
}

impl CipherGateway for AesGcmGateway {
    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>> {
        if plaintext.is_empty() {
            return Ok(Vec::new());
        }

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| {
                error!("encryption failed: {e}");
                SecretError::EncryptionFailed
            })?;

        Ok(field::join(&nonce, &sealed))
    }

    fn decrypt(&self, blob: &[u8]) -> Result<SecretString> {
        if blob.is_empty() {
            return Ok(SecretString::default());
        }

        let (nonce, sealed) = field::split(blob).map_err(|e| {
            error!(len = blob.len(), "decryption failed: blob shorter than nonce");
            e
        })?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| {
                error!(
                    len = blob.len(),
                    "decryption failed: authentication tag mismatch (tampered, corrupted, or foreign key)"
                );
                SecretError::DecryptionFailed
            })?;

        SecretString::from_utf8(plaintext).map_err(|e| {
            error!("decryption failed: plaintext is not UTF-8: {e}");
            SecretError::DecryptionFailed
        })
    }

    fn name(&self) -> &'static str {
        "aes_gcm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{sealed_len, TAG_LEN};

    fn test_gateway() -> AesGcmGateway {
        // Fixed key keeps failures reproducible
        AesGcmGateway::new(&SymmetricKey::from_bytes(&[b'0'; 32]).unwrap())
    }

    #[test]
    fn test_round_trip_encrypt_decrypt() {
        let gateway = test_gateway();
        let plaintext = "this is a secret api key";

        let encrypted = gateway.encrypt(plaintext).unwrap();
        assert_ne!(encrypted, plaintext.as_bytes());
        assert!(!encrypted.is_empty());

        let decrypted = gateway.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted.expose_secret(), plaintext);
    }

    #[test]
    fn test_round_trip_multibyte_utf8() {
        let gateway = test_gateway();
        let plaintext = "ключ-🔑-鍵";
        let encrypted = gateway.encrypt(plaintext).unwrap();
        assert_eq!(encrypted.len(), sealed_len(plaintext.len()));
        assert_eq!(gateway.decrypt(&encrypted).unwrap().expose_secret(), plaintext);
    }

    #[test]
    fn test_blob_layout_length() {
        let gateway = test_gateway();
        let encrypted = gateway.encrypt("sk-abcdef").unwrap();
        assert_eq!(encrypted.len(), NONCE_LEN + "sk-abcdef".len() + TAG_LEN);
    }

    #[test]
    fn test_fresh_nonce_per_encryption() {
        let gateway = test_gateway();
        let plaintext = "same plain text";

        let a = gateway.encrypt(plaintext).unwrap();
        let b = gateway.encrypt(plaintext).unwrap();

        assert_ne!(a, b);
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_eq!(gateway.decrypt(&a).unwrap().expose_secret(), plaintext);
        assert_eq!(gateway.decrypt(&b).unwrap().expose_secret(), plaintext);
    }

    #[test]
    fn test_empty_values() {
        let gateway = test_gateway();
        assert!(gateway.encrypt("").unwrap().is_empty());
        assert!(gateway.decrypt(b"").unwrap().is_empty());
    }

    #[test]
    fn test_missing_values_are_invalid_input() {
        let gateway = test_gateway();
        assert!(matches!(
            gateway.encrypt_opt(None),
            Err(SecretError::InvalidInput(_))
        ));
        assert!(matches!(
            gateway.decrypt_opt(None),
            Err(SecretError::InvalidInput(_))
        ));
        assert!(gateway.encrypt_opt(Some("")).unwrap().is_empty());
        assert!(gateway.decrypt_opt(Some(&b""[..])).unwrap().is_empty());
    }

    #[test]
    fn test_every_bit_flip_is_detected() {
        let gateway = test_gateway();
        let encrypted = gateway.encrypt("secret data").unwrap();

        for byte in 0..encrypted.len() {
            for bit in 0..8 {
                let mut tampered = encrypted.clone();
                tampered[byte] ^= 1 << bit;
                let result = gateway.decrypt(&tampered);
                assert!(
                    matches!(result, Err(SecretError::DecryptionFailed)),
                    "flip at byte {byte} bit {bit} was not detected"
                );
            }
        }
    }

    #[test]
    fn test_short_blob_is_malformed() {
        let gateway = test_gateway();
        let result = gateway.decrypt(b"too short");
        assert!(matches!(
            result,
            Err(SecretError::MalformedCiphertext { len: 9 })
        ));
    }

    #[test]
    fn test_nonce_only_blob_fails_authentication() {
        let gateway = test_gateway();
        let result = gateway.decrypt(&[0u8; NONCE_LEN]);
        assert!(matches!(result, Err(SecretError::DecryptionFailed)));
    }

    #[test]
    fn test_wrong_key_fails() {
        let a = test_gateway();
        let b = AesGcmGateway::generated();

        let encrypted = a.encrypt("sensitive data").unwrap();
        let result = b.decrypt(&encrypted);
        assert!(matches!(result, Err(SecretError::DecryptionFailed)));
    }

    #[test]
    fn test_error_message_is_generic() {
        let gateway = test_gateway();
        let mut encrypted = gateway.encrypt("secret data").unwrap();
        let last = encrypted.len() - 1;
        encrypted[last] ^= 1;

        let tampered = gateway.decrypt(&encrypted).unwrap_err();
        let short = gateway.decrypt(b"abc").unwrap_err();
        assert_eq!(tampered.to_string(), short.to_string());
    }
}
