//! Multi-recipient hybrid envelopes.
//!
//! A payload is encrypted once under a random data key (DEK). The DEK is then
//! wrapped separately for each recipient:
//!
//! 1. Generate an ephemeral secp256k1 key pair.
//! 2. ECDH between the ephemeral scalar and the recipient's public point.
//! 3. SHA-256 the shared secret into a wrapping key.
//! 4. AES-256-GCM encrypt the DEK under the wrapping key.
//! 5. Store `{ephemeralPublicKey, wrappedCiphertext, iv, authTag}` under the
//!    recipient's fingerprint.
//!
//! A recipient reverses the process with their own scalar and the stored
//! ephemeral point. Only the 32-byte DEK is wrapped per recipient, so the
//! payload is never re-encrypted as the recipient set grows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::exchange::wrapping_key;
use crate::keys::{KeyPair, PublicKey};
use crate::payload::{canonical_bytes, from_bytes};
use crate::symmetric::{self, DataKey, IV_SIZE, SealedBytes, TAG_SIZE};

/// A data key wrapped for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedKey {
    pub ephemeral_public_key: PublicKey,
    #[serde(with = "hex")]
    pub wrapped_ciphertext: Vec<u8>,
    #[serde(with = "hex")]
    pub iv: [u8; IV_SIZE],
    #[serde(with = "hex")]
    pub auth_tag: [u8; TAG_SIZE],
}

/// An encrypted payload plus one wrapped data key per recipient.
///
/// Immutable once sealed; fields are exposed read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(with = "hex")]
    ciphertext: Vec<u8>,
    #[serde(with = "hex")]
    iv: [u8; IV_SIZE],
    #[serde(with = "hex")]
    auth_tag: [u8; TAG_SIZE],
    wrapped_keys: BTreeMap<String, WrappedKey>,
}

impl Envelope {
    /// Encrypt `payload` for every key in `recipients`.
    ///
    /// Duplicate recipients share one wrapped entry.
    pub fn seal(payload: &Value, recipients: &[PublicKey]) -> Result<Self, CryptoError> {
        if recipients.is_empty() {
            return Err(CryptoError::NoRecipients);
        }

        let dek = DataKey::generate();
        let mut plaintext = canonical_bytes(payload);
        let sealed = symmetric::encrypt(&plaintext, &dek);
        plaintext.zeroize();
        let sealed = sealed?;

        let mut wrapped_keys = BTreeMap::new();
        for recipient in recipients {
            let fingerprint = recipient.fingerprint();
            if wrapped_keys.contains_key(&fingerprint) {
                continue;
            }
            wrapped_keys.insert(fingerprint, wrap_for(&dek, recipient)?);
        }

        tracing::debug!(
            recipients = wrapped_keys.len(),
            ciphertext_len = sealed.ciphertext.len(),
            "Sealed envelope"
        );

        Ok(Self {
            ciphertext: sealed.ciphertext,
            iv: sealed.iv,
            auth_tag: sealed.auth_tag,
            wrapped_keys,
        })
    }

    /// Decrypt the payload with the recipient's key pair.
    pub fn open(&self, recipient: &KeyPair) -> Result<Value, CryptoError> {
        self.open_as(recipient, recipient.public_key())
    }

    /// Decrypt the payload, routing by `public_key` and unwrapping with the
    /// scalar of `recipient`.
    ///
    /// Fails with [`CryptoError::NotAuthorized`] when `public_key` has no entry
    /// and with [`CryptoError::DecryptionFailed`] when either the unwrap or the
    /// payload decryption does not authenticate.
    pub fn open_as(&self, recipient: &KeyPair, public_key: &PublicKey) -> Result<Value, CryptoError> {
        let fingerprint = public_key.fingerprint();
        let entry = self
            .wrapped_keys
            .get(&fingerprint)
            .ok_or(CryptoError::NotAuthorized { fingerprint })?;

        let dek = unwrap_with(entry, recipient)?;
        let mut plaintext = symmetric::decrypt(&self.ciphertext, &dek, &self.iv, &self.auth_tag)?;
        let payload = from_bytes(&plaintext)
            .map_err(|e| CryptoError::SerializationError(format!("decrypted payload: {e}")));
        plaintext.zeroize();
        payload
    }

    /// Whether `public_key` has a wrapped entry in this envelope.
    pub fn is_recipient(&self, public_key: &PublicKey) -> bool {
        self.wrapped_keys.contains_key(&public_key.fingerprint())
    }

    /// Fingerprints of every recipient, in sorted order.
    pub fn recipient_fingerprints(&self) -> Vec<String> {
        self.wrapped_keys.keys().cloned().collect()
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub const fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    pub const fn auth_tag(&self) -> &[u8; TAG_SIZE] {
        &self.auth_tag
    }

    pub const fn wrapped_keys(&self) -> &BTreeMap<String, WrappedKey> {
        &self.wrapped_keys
    }
}

fn wrap_for(dek: &DataKey, recipient: &PublicKey) -> Result<WrappedKey, CryptoError> {
    let ephemeral = KeyPair::generate();
    let kek = wrapping_key(&ephemeral, recipient);
    let SealedBytes {
        ciphertext,
        iv,
        auth_tag,
    } = symmetric::encrypt(dek.as_bytes(), &kek)?;
    Ok(WrappedKey {
        ephemeral_public_key: *ephemeral.public_key(),
        wrapped_ciphertext: ciphertext,
        iv,
        auth_tag,
    })
}

fn unwrap_with(entry: &WrappedKey, recipient: &KeyPair) -> Result<DataKey, CryptoError> {
    let kek = wrapping_key(recipient, &entry.ephemeral_public_key);
    let mut raw = symmetric::decrypt(&entry.wrapped_ciphertext, &kek, &entry.iv, &entry.auth_tag)?;
    let dek = DataKey::from_slice(&raw).map_err(|_| CryptoError::DecryptionFailed);
    raw.zeroize();
    dek
}

/// Seal `payload` for hex-encoded recipient keys.
///
/// Fails with [`CryptoError::InvalidKey`] if any key does not parse.
pub fn create_envelope<S: AsRef<str>>(
    payload: &Value,
    recipient_public_keys: &[S],
) -> Result<Envelope, CryptoError> {
    let recipients = recipient_public_keys
        .iter()
        .map(|k| PublicKey::from_hex(k.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Envelope::seal(payload, &recipients)
}

/// Open an envelope with hex-encoded recipient key material.
pub fn open_envelope(
    envelope: &Envelope,
    recipient_private_key: &str,
    recipient_public_key: &str,
) -> Result<Value, CryptoError> {
    let keypair = KeyPair::from_private_hex(recipient_private_key)?;
    let public_key = PublicKey::from_hex(recipient_public_key)?;
    envelope.open_as(&keypair, &public_key)
}
