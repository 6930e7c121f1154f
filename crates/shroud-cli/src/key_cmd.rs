//! Key subcommands: keygen, fingerprint, sign, verify-signature.

use std::path::Path;

use serde_json::json;
use tracing::info;

use shroud_crypto::{KeyPair, PublicKey, sign_commitment, verify_commitment_signature};

use crate::Outcome;

pub fn keygen(out: Option<&Path>) -> anyhow::Result<Outcome> {
    let keypair = KeyPair::generate();
    let mut output = json!({
        "publicKey": keypair.public_hex(),
        "fingerprint": keypair.fingerprint(),
    });
    match out {
        Some(path) => {
            keypair.save_to_file(path)?;
            info!(path = %path.display(), fingerprint = %keypair.fingerprint(), "Saved key pair");
        }
        None => {
            output["privateKey"] = json!(keypair.private_hex());
        }
    }
    Ok(Outcome::ok(output))
}

pub fn fingerprint(public_key: &str) -> anyhow::Result<Outcome> {
    Ok(Outcome::ok(json!(shroud_crypto::fingerprint(public_key)?)))
}

pub fn sign(key: &Path, hash: &str) -> anyhow::Result<Outcome> {
    let keypair = KeyPair::load_from_file(key)?;
    let signature = sign_commitment(hash, &keypair)?;
    Ok(Outcome::ok(json!({
        "signature": signature,
        "publicKey": keypair.public_hex(),
    })))
}

/// Malformed keys or signatures are reported as an invalid signature.
pub fn verify_signature(public_key: &str, hash: &str, signature: &str) -> Outcome {
    let valid = PublicKey::from_hex(public_key)
        .is_ok_and(|pk| verify_commitment_signature(hash, signature, &pk));
    Outcome::verdict(valid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    #[test]
    fn keygen_without_out_prints_private_key() {
        let outcome = keygen(None).unwrap();
        let private = outcome.output["privateKey"].as_str().unwrap();
        let restored = KeyPair::from_private_hex(private).unwrap();
        assert_eq!(
            outcome.output["publicKey"].as_str().unwrap(),
            restored.public_hex()
        );
    }

    #[test]
    fn keygen_with_out_keeps_private_key_off_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("party.key");

        let outcome = keygen(Some(&path)).unwrap();
        assert!(outcome.output.get("privateKey").is_none());

        let loaded = KeyPair::load_from_file(&path).unwrap();
        assert_eq!(outcome.output["fingerprint"], json!(loaded.fingerprint()));
    }

    #[test]
    fn fingerprint_matches_keypair() {
        let kp = KeyPair::generate();
        let outcome = fingerprint(&kp.public_hex()).unwrap();
        assert_eq!(outcome.output, json!(kp.fingerprint()));
    }

    #[test]
    fn sign_then_verify_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signer.key");
        keygen(Some(&path)).unwrap();

        let signed = sign(&path, HASH).unwrap().output;
        let signature = signed["signature"].as_str().unwrap();
        let public_key = signed["publicKey"].as_str().unwrap();

        assert!(verify_signature(public_key, HASH, signature).success);
        let other = KeyPair::generate().public_hex();
        assert!(!verify_signature(&other, HASH, signature).success);
    }

    #[test]
    fn garbage_public_key_is_invalid_not_an_error() {
        assert!(!verify_signature("zz", HASH, "00").success);
    }
}
