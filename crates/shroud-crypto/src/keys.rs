//! Party key pairs.
//!
//! Every party holds a long-lived secp256k1 key pair. The public point is the
//! party's address for envelope recipients and signature verification; the
//! scalar stays with the party and is only ever loaded client-side.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Size of a secp256k1 private scalar in bytes.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Size of an uncompressed SEC1 public point in bytes.
pub const PUBLIC_KEY_SIZE: usize = 65;

/// Number of hash bytes kept in a fingerprint (40 hex characters).
pub const FINGERPRINT_SIZE: usize = 20;

/// A party's secp256k1 public key.
///
/// Accepts compressed or uncompressed SEC1 encodings on input; always renders
/// as uncompressed lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(k256::PublicKey);

impl PublicKey {
    /// Parse a hex-encoded SEC1 point, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(strip_0x(s.trim()))
            .map_err(|e| CryptoError::InvalidKey(format!("public key is not hex: {e}")))?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Parse raw SEC1 point bytes.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        k256::PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidKey("not a valid secp256k1 point".into()))
    }

    /// Uncompressed SEC1 encoding (`0x04 || x || y`).
    pub fn to_uncompressed_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Uncompressed SEC1 encoding as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_uncompressed_bytes())
    }

    /// Routing fingerprint of this key. See [`fingerprint_of`].
    pub fn fingerprint(&self) -> String {
        fingerprint_of(&self.to_uncompressed_bytes())
    }

    pub(crate) const fn as_k256(&self) -> &k256::PublicKey {
        &self.0
    }
}

impl From<k256::PublicKey> for PublicKey {
    fn from(key: k256::PublicKey) -> Self {
        Self(key)
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A secp256k1 key pair for a party.
pub struct KeyPair {
    secret: k256::SecretKey,
    public: PublicKey,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public.to_hex())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl KeyPair {
    /// Generate a new random key pair from the OS entropy source.
    pub fn generate() -> Self {
        Self::from_secret(k256::SecretKey::random(&mut OsRng))
    }

    pub(crate) fn from_secret(secret: k256::SecretKey) -> Self {
        let public = PublicKey(secret.public_key());
        Self { secret, public }
    }

    /// Reconstruct from raw 32-byte big-endian scalar bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "expected {PRIVATE_KEY_SIZE} private key bytes, got {}",
                bytes.len()
            )));
        }
        let secret = k256::SecretKey::from_slice(bytes)
            .map_err(|_| CryptoError::InvalidKey("private scalar out of range".into()))?;
        Ok(Self::from_secret(secret))
    }

    /// Reconstruct from a hex-encoded scalar.
    ///
    /// Big-integer encodings may drop leading zeros, so anything from 1 to 64
    /// hex digits is accepted and left-padded.
    pub fn from_private_hex(s: &str) -> Result<Self, CryptoError> {
        let digits = strip_0x(s.trim());
        if digits.is_empty() || digits.len() > PRIVATE_KEY_SIZE * 2 {
            return Err(CryptoError::InvalidKey(format!(
                "private key must be 1-{} hex digits, got {}",
                PRIVATE_KEY_SIZE * 2,
                digits.len()
            )));
        }
        let mut padded = format!("{digits:0>64}");
        let decoded = hex::decode(&padded);
        padded.zeroize();
        let mut bytes =
            decoded.map_err(|e| CryptoError::InvalidKey(format!("private key is not hex: {e}")))?;
        let result = Self::from_secret_bytes(&bytes);
        bytes.zeroize();
        result
    }

    /// Get the public key.
    pub const fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Get the public key as uncompressed hex.
    pub fn public_hex(&self) -> String {
        self.public.to_hex()
    }

    /// Get the secret scalar as raw bytes. Handle with care.
    pub fn secret_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        let mut out = [0u8; PRIVATE_KEY_SIZE];
        out.copy_from_slice(&self.secret.to_bytes());
        out
    }

    /// Get the secret scalar as 64 hex digits. Handle with care.
    pub fn private_hex(&self) -> String {
        let mut bytes = self.secret_bytes();
        let encoded = hex::encode(bytes);
        bytes.zeroize();
        encoded
    }

    /// Routing fingerprint of the public key.
    pub fn fingerprint(&self) -> String {
        self.public.fingerprint()
    }

    pub(crate) const fn secret(&self) -> &k256::SecretKey {
        &self.secret
    }

    /// Save the secret scalar to a file with restrictive permissions.
    pub fn save_to_file(&self, path: &Path) -> Result<(), CryptoError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let mut bytes = self.secret_bytes();
        let written = std::fs::write(path, bytes);
        bytes.zeroize();
        written?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Load a key pair from a file containing the 32-byte secret scalar.
    ///
    /// On Unix, refuses files readable by anyone but the owner.
    pub fn load_from_file(path: &Path) -> Result<Self, CryptoError> {
        use std::io::Read;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
            if mode != 0o600 {
                return Err(CryptoError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("Key file has insecure permissions: {mode:o} (expected 600)"),
                )));
            }
        }

        let mut file = std::fs::File::open(path)?;
        let mut buf = [0u8; PRIVATE_KEY_SIZE];
        file.read_exact(&mut buf)?;
        let result = Self::from_secret_bytes(&buf);
        buf.zeroize();
        result
    }

    /// Load from file, or generate a new key pair and save it.
    pub fn load_or_generate(path: &Path) -> Result<Self, CryptoError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            let kp = Self::generate();
            kp.save_to_file(path)?;
            tracing::info!(fingerprint = %kp.fingerprint(), "Generated new key pair");
            Ok(kp)
        }
    }
}

/// Fingerprint of raw public key bytes: the first 20 bytes of their SHA-256,
/// as 40 lowercase hex characters.
///
/// Callers should pass the uncompressed SEC1 encoding so that every encoding
/// of one key maps to one fingerprint.
pub fn fingerprint_of(public_key_bytes: &[u8]) -> String {
    let hash = Sha256::digest(public_key_bytes);
    hex::encode(&hash[..FINGERPRINT_SIZE])
}

/// Fingerprint of a hex-encoded public key.
pub fn fingerprint(public_key_hex: &str) -> Result<String, CryptoError> {
    Ok(PublicKey::from_hex(public_key_hex)?.fingerprint())
}

pub(crate) fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
