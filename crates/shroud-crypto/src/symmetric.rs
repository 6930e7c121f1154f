//! Authenticated symmetric encryption.
//!
//! AES-256-GCM with a detached 16-byte tag and a fresh random 12-byte IV on
//! every call. The IV is always generated here; callers cannot supply one.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Size of a data encryption key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM IV in bytes.
pub const IV_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// A 256-bit symmetric key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_SIZE]);

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DataKey([REDACTED])")
    }
}

impl DataKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Build a key from exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "expected {KEY_SIZE} key bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl From<[u8; KEY_SIZE]> for DataKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

/// Ciphertext with the IV and tag needed to decrypt it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBytes {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_SIZE],
    pub auth_tag: [u8; TAG_SIZE],
}

/// Encrypt `plaintext` under `key` with a freshly drawn IV.
pub fn encrypt(plaintext: &[u8], key: &DataKey) -> Result<SealedBytes, CryptoError> {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let mut buffer = plaintext.to_vec();
    let tag = key
        .cipher()
        .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut auth_tag = [0u8; TAG_SIZE];
    auth_tag.copy_from_slice(&tag);

    Ok(SealedBytes {
        ciphertext: buffer,
        iv,
        auth_tag,
    })
}

/// Decrypt and authenticate. Fails closed with [`CryptoError::DecryptionFailed`]
/// if the tag does not verify; no plaintext is returned in that case.
pub fn decrypt(
    ciphertext: &[u8],
    key: &DataKey,
    iv: &[u8],
    auth_tag: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if iv.len() != IV_SIZE {
        return Err(CryptoError::InvalidNonceLength {
            expected: IV_SIZE,
            actual: iv.len(),
        });
    }
    if auth_tag.len() != TAG_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }

    let mut buffer = ciphertext.to_vec();
    match key.cipher().decrypt_in_place_detached(
        Nonce::from_slice(iv),
        b"",
        &mut buffer,
        Tag::from_slice(auth_tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(CryptoError::DecryptionFailed)
        }
    }
}

impl SealedBytes {
    /// Decrypt these bytes under `key`.
    pub fn open(&self, key: &DataKey) -> Result<Vec<u8>, CryptoError> {
        decrypt(&self.ciphertext, key, &self.iv, &self.auth_tag)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = DataKey::generate();
        let sealed = encrypt(b"Hello, sealed world!", &key).unwrap();
        let opened = decrypt(&sealed.ciphertext, &key, &sealed.iv, &sealed.auth_tag).unwrap();
        assert_eq!(opened, b"Hello, sealed world!");
    }

    #[test]
    fn ciphertext_length_matches_plaintext() {
        let key = DataKey::generate();
        let sealed = encrypt(&[0xABu8; 300], &key).unwrap();
        assert_eq!(sealed.ciphertext.len(), 300);
        assert_ne!(sealed.ciphertext, vec![0xABu8; 300]);
    }

    #[test]
    fn encrypt_empty_data() {
        let key = DataKey::generate();
        let sealed = encrypt(b"", &key).unwrap();
        assert!(sealed.open(&key).unwrap().is_empty());
    }

    #[test]
    fn encrypt_large_data() {
        let key = DataKey::generate();
        let plaintext = vec![0x5Au8; 1024 * 1024];
        let sealed = encrypt(&plaintext, &key).unwrap();
        assert_eq!(sealed.open(&key).unwrap(), plaintext);
    }

    #[test]
    fn iv_never_repeats_under_one_key() {
        let key = DataKey::generate();
        let mut ivs = std::collections::HashSet::new();
        for _ in 0..1000 {
            let sealed = encrypt(b"x", &key).unwrap();
            assert!(ivs.insert(sealed.iv), "iv collision detected");
        }
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let sealed = encrypt(b"secret data", &DataKey::generate()).unwrap();
        let result = sealed.open(&DataKey::generate());
        assert!(matches!(result, Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn decrypt_with_tampered_ciphertext_fails() {
        let key = DataKey::generate();
        let mut sealed = encrypt(b"secret data", &key).unwrap();
        if let Some(byte) = sealed.ciphertext.first_mut() {
            *byte ^= 0xFF;
        }
        assert!(matches!(sealed.open(&key), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn decrypt_with_tampered_tag_fails() {
        let key = DataKey::generate();
        let mut sealed = encrypt(b"secret data", &key).unwrap();
        sealed.auth_tag[0] ^= 0x01;
        assert!(matches!(sealed.open(&key), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn decrypt_with_wrong_iv_fails() {
        let key = DataKey::generate();
        let sealed = encrypt(b"secret data", &key).unwrap();
        let result = decrypt(&sealed.ciphertext, &key, &[0u8; IV_SIZE], &sealed.auth_tag);
        assert!(matches!(result, Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn decrypt_with_invalid_iv_length_returns_error() {
        let key = DataKey::generate();
        let result = decrypt(b"ciphertext", &key, &[0u8; 8], &[0u8; TAG_SIZE]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidNonceLength {
                expected: IV_SIZE,
                actual: 8
            })
        ));
    }

    #[test]
    fn decrypt_with_short_tag_fails_closed() {
        let key = DataKey::generate();
        let sealed = encrypt(b"secret data", &key).unwrap();
        let result = decrypt(&sealed.ciphertext, &key, &sealed.iv, &sealed.auth_tag[..8]);
        assert!(matches!(result, Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn data_key_from_slice_checks_length() {
        assert!(DataKey::from_slice(&[0u8; 31]).is_err());
        let key = DataKey::from_slice(&[9u8; KEY_SIZE]).unwrap();
        assert_eq!(key.as_bytes(), &[9u8; KEY_SIZE]);
    }

    #[test]
    fn data_key_debug_is_redacted() {
        let key = DataKey::from([7u8; KEY_SIZE]);
        assert_eq!(format!("{key:?}"), "DataKey([REDACTED])");
    }
}
