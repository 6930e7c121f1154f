//! ECDSA signatures over commitment hashes.
//!
//! secp256k1 ECDSA with SHA-256 and RFC 6979 deterministic nonces; signatures
//! travel as hex-encoded DER. Parties sign the published commitment hash,
//! never the plaintext payload.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};

use crate::commitment::decode_digest;
use crate::error::CryptoError;
use crate::keys::{KeyPair, PublicKey, strip_0x};

/// Sign `message` with `signer`, returning hex DER.
pub fn sign(message: &[u8], signer: &KeyPair) -> String {
    let signing_key = SigningKey::from(signer.secret());
    let signature: Signature = signing_key.sign(message);
    hex::encode(signature.to_der().as_bytes())
}

/// Sign `message` with a hex-encoded private key.
pub fn sign_with_private_hex(message: &[u8], private_key: &str) -> Result<String, CryptoError> {
    Ok(sign(message, &KeyPair::from_private_hex(private_key)?))
}

/// Verify a hex DER signature. Malformed keys or signatures yield `false`.
pub fn verify(message: &[u8], signature_hex: &str, public_key: &PublicKey) -> bool {
    let Ok(der) = hex::decode(strip_0x(signature_hex.trim())) else {
        return false;
    };
    let Ok(signature) = Signature::from_der(&der) else {
        return false;
    };
    VerifyingKey::from(public_key.as_k256())
        .verify(message, &signature)
        .is_ok()
}

/// [`verify`] with a hex-encoded public key.
pub fn verify_with_public_hex(message: &[u8], signature_hex: &str, public_key: &str) -> bool {
    PublicKey::from_hex(public_key).is_ok_and(|pk| verify(message, signature_hex, &pk))
}

/// Sign the 32 digest bytes of a commitment hash.
pub fn sign_commitment(commitment_hash: &str, signer: &KeyPair) -> Result<String, CryptoError> {
    let digest = decode_digest(commitment_hash).ok_or_else(|| {
        CryptoError::InvalidEncoding("commitment hash must be 32 hex-encoded bytes".into())
    })?;
    Ok(sign(&digest, signer))
}

/// Verify a signature produced by [`sign_commitment`].
pub fn verify_commitment_signature(
    commitment_hash: &str,
    signature_hex: &str,
    public_key: &PublicKey,
) -> bool {
    decode_digest(commitment_hash).is_some_and(|digest| verify(&digest, signature_hex, public_key))
}
