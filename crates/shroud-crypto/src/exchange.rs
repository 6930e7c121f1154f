//! Key agreement for wrapping data keys.
//!
//! secp256k1 ECDH between an ephemeral scalar and a recipient's long-term
//! point. The wrapping key is SHA-256 of the shared x-coordinate.

use k256::ecdh::diffie_hellman;
use sha2::{Digest, Sha256};

use crate::keys::{KeyPair, PublicKey};
use crate::symmetric::{DataKey, KEY_SIZE};

/// Derive the key that wraps a data key between `local` and `remote`.
///
/// Symmetric: `wrapping_key(a, B) == wrapping_key(b, A)`.
pub fn wrapping_key(local: &KeyPair, remote: &PublicKey) -> DataKey {
    let shared = diffie_hellman(
        local.secret().to_nonzero_scalar(),
        remote.as_k256().as_affine(),
    );
    let digest = Sha256::digest(shared.raw_secret_bytes());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest);
    DataKey::from(key)
}
