//! Commitment subcommands: commit, verify-commitment.

use std::path::Path;

use serde_json::Value;

use shroud_crypto::commitment;

use crate::Outcome;
use crate::input::read_json;

pub fn commit(payload: &Path, nonce: Option<&str>) -> anyhow::Result<Outcome> {
    let payload: Value = read_json(payload)?;
    let nonce = nonce.map(commitment::decode_nonce).transpose()?;
    let c = commitment::commit(&payload, nonce.as_deref());
    Ok(Outcome::ok(serde_json::to_value(&c)?))
}

pub fn verify(payload: &Path, nonce: &str, hash: &str) -> anyhow::Result<Outcome> {
    let payload: Value = read_json(payload)?;
    Ok(Outcome::verdict(commitment::verify(&payload, nonce, hash)))
}
