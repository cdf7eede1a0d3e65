//! AES-256-GCM encryption for personally identifying fields.
//!
//! Every call draws a fresh random 12-byte nonce. Stored form is base64 of
//! `nonce || ciphertext || tag`. Empty input passes through unchanged in both
//! directions.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use tracing::error;

use crate::error::{CoreError, CoreResult};

/// Nonce size for AES-256-GCM (12 bytes).
const NONCE_SIZE: usize = 12;
/// AES-256 key size (32 bytes).
pub const KEY_SIZE: usize = 32;
/// GCM tag size (16 bytes).
const TAG_SIZE: usize = 16;

/// Authenticated field cipher bound to one injected key.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldCipher { .. }")
    }
}

impl FieldCipher {
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Build from a base64-encoded 256-bit key.
    pub fn from_base64_key(key_b64: &str) -> CoreResult<Self> {
        let bytes = STANDARD
            .decode(key_b64.trim())
            .map_err(|e| CoreError::Internal(format!("encryption key is not base64: {e}")))?;
        let key: [u8; KEY_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::Internal(format!(
                "encryption key must be {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::new(&key))
    }

    /// Encrypt a field value. Returns base64 `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &str) -> CoreResult<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CoreError::Internal(format!("field encryption failed: {e}")))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(&combined))
    }

    /// Decrypt base64 `nonce || ciphertext || tag`.
    ///
    /// Any malformed input or tag mismatch fails with `DECRYPTION_ERROR`;
    /// no partial plaintext is ever returned.
    pub fn decrypt(&self, encrypted_b64: &str) -> CoreResult<String> {
        if encrypted_b64.is_empty() {
            return Ok(String::new());
        }

        let combined = STANDARD.decode(encrypted_b64).map_err(|e| {
            error!(error = %e, "field decryption: base64 decode failed");
            CoreError::Decryption(format!("base64 decode failed: {e}"))
        })?;

        if combined.len() < NONCE_SIZE + TAG_SIZE {
            error!(len = combined.len(), "field decryption: ciphertext too short");
            return Err(CoreError::Decryption("ciphertext too short".into()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| {
                error!("field decryption: authentication tag mismatch");
                CoreError::Decryption("authentication failed".into())
            })?;

        String::from_utf8(plaintext).map_err(|e| {
            error!(error = %e, "field decryption: plaintext is not UTF-8");
            CoreError::Decryption("plaintext is not UTF-8".into())
        })
    }
}

/// Generate a random 256-bit key, base64-encoded.
pub fn generate_key_base64() -> String {
    let mut key = [0u8; KEY_SIZE];
    rand::rng().fill_bytes(&mut key);
    STANDARD.encode(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::new(&[7u8; KEY_SIZE])
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let c = cipher();
        for plaintext in ["7ABC123", "Bakı, Nəsimi rayonu, mənzil 42", "x"] {
            let encrypted = c.encrypt(plaintext).unwrap();
            assert_ne!(encrypted, plaintext);
            assert_eq!(c.decrypt(&encrypted).unwrap(), plaintext);
        }
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let c = cipher();
        assert_eq!(c.encrypt("").unwrap(), "");
        assert_eq!(c.decrypt("").unwrap(), "");
    }

    #[test]
    fn nonce_is_fresh_per_call() {
        let c = cipher();
        let a = c.encrypt("7ABC123").unwrap();
        let b = c.encrypt("7ABC123").unwrap();
        assert_ne!(a, b);
        let na = &STANDARD.decode(&a).unwrap()[..NONCE_SIZE];
        let nb = &STANDARD.decode(&b).unwrap()[..NONCE_SIZE];
        assert_ne!(na, nb);
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let c = cipher();
        let encrypted = c.encrypt("7ABC123").unwrap();
        let mut raw = STANDARD.decode(&encrypted).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = STANDARD.encode(&raw);
        assert!(matches!(c.decrypt(&tampered), Err(CoreError::Decryption(_))));

        let mut raw = STANDARD.decode(&encrypted).unwrap();
        raw[NONCE_SIZE] ^= 0x80;
        assert!(matches!(
            c.decrypt(&STANDARD.encode(&raw)),
            Err(CoreError::Decryption(_))
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let encrypted = cipher().encrypt("secret").unwrap();
        let other = FieldCipher::new(&[8u8; KEY_SIZE]);
        assert!(matches!(other.decrypt(&encrypted), Err(CoreError::Decryption(_))));
    }

    #[test]
    fn malformed_input_fails() {
        let c = cipher();
        assert!(matches!(c.decrypt("%%%"), Err(CoreError::Decryption(_))));
        assert!(matches!(
            c.decrypt(&STANDARD.encode([0u8; 10])),
            Err(CoreError::Decryption(_))
        ));
    }

    #[test]
    fn base64_key_must_be_256_bits() {
        assert!(FieldCipher::from_base64_key(&generate_key_base64()).is_ok());
        assert!(FieldCipher::from_base64_key(&STANDARD.encode([1u8; 16])).is_err());
        assert!(FieldCipher::from_base64_key("not base64!").is_err());
    }
}
