//! Hiding commitments over payloads.
//!
//! `hash = SHA-256("shroud/commitment/v1" || canonical JSON || nonce)`,
//! rendered as `0x` + 64 hex digits. The canonical JSON is self-delimiting, so
//! the payload/nonce boundary is unambiguous. Only the hash is published;
//! opening a commitment means presenting the payload and nonce.

use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;
use crate::keys::strip_0x;
use crate::payload::canonical_bytes;

/// Domain tag keeping commitment hashes apart from every other hash in the
/// system.
const COMMITMENT_DOMAIN: &[u8] = b"shroud/commitment/v1";

/// Size of a generated nonce in bytes.
pub const NONCE_SIZE: usize = 32;

/// Size of a commitment digest in bytes.
pub const HASH_SIZE: usize = 32;

/// A published hash plus the secret nonce that opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// `0x`-prefixed lowercase hex digest.
    pub hash: String,
    /// Lowercase hex nonce.
    pub nonce: String,
}

impl Commitment {
    /// Check that `payload` opens this commitment.
    pub fn opens_to(&self, payload: &Value) -> bool {
        verify(payload, &self.nonce, &self.hash)
    }

    /// Raw digest bytes of the hash.
    pub fn hash_bytes(&self) -> Option<[u8; HASH_SIZE]> {
        decode_digest(&self.hash)
    }
}

/// Commit to `payload`. Without a nonce, 32 random bytes are drawn.
pub fn commit(payload: &Value, nonce: Option<&[u8]>) -> Commitment {
    let nonce = nonce.map_or_else(
        || {
            let mut fresh = vec![0u8; NONCE_SIZE];
            OsRng.fill_bytes(&mut fresh);
            fresh
        },
        <[u8]>::to_vec,
    );
    let digest = commitment_digest(payload, &nonce);
    Commitment {
        hash: format!("0x{}", hex::encode(digest)),
        nonce: hex::encode(nonce),
    }
}

/// Recompute the commitment for `(payload, nonce)` and compare it with
/// `expected_hash` in constant time.
///
/// Hex comparison is case-insensitive and the `0x` prefix is optional.
/// Malformed nonces or hashes yield `false`.
pub fn verify(payload: &Value, nonce_hex: &str, expected_hash: &str) -> bool {
    let Ok(nonce) = decode_nonce(nonce_hex) else {
        return false;
    };
    let Some(expected) = decode_digest(expected_hash) else {
        return false;
    };
    let actual = commitment_digest(payload, &nonce);
    actual[..].ct_eq(&expected[..]).into()
}

/// Decode a hex nonce. Surrounding whitespace, case and a single `0x`/`0X`
/// prefix are tolerated, matching what [`verify`] accepts.
pub fn decode_nonce(nonce_hex: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(strip_0x(nonce_hex.trim()))
        .map_err(|e| CryptoError::InvalidEncoding(format!("nonce: {e}")))
}

fn commitment_digest(payload: &Value, nonce: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(COMMITMENT_DOMAIN);
    hasher.update(canonical_bytes(payload));
    hasher.update(nonce);
    let mut digest = [0u8; HASH_SIZE];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Decode a 32-byte hex digest, tolerating case and a `0x` prefix.
pub(crate) fn decode_digest(s: &str) -> Option<[u8; HASH_SIZE]> {
    let bytes = hex::decode(strip_0x(s.trim())).ok()?;
    bytes.try_into().ok()
}
