//! Envelope subcommands: seal, open.

use std::path::Path;

use serde_json::Value;
use tracing::info;

use shroud_core::Error;
use shroud_core::config::LimitsConfig;
use shroud_crypto::{Envelope, KeyPair, PublicKey, canonical_bytes};

use crate::Outcome;
use crate::input::read_json;

/// Seal a payload file. The configured size and recipient limits apply here
/// the same way they do to submitted transactions.
pub fn seal(
    payload: &Path,
    recipients: &[String],
    limits: &LimitsConfig,
) -> anyhow::Result<Outcome> {
    let payload: Value = read_json(payload)?;
    let size = canonical_bytes(&payload).len();
    if size > limits.max_payload_bytes {
        return Err(Error::PayloadTooLarge {
            size,
            limit: limits.max_payload_bytes,
        }
        .into());
    }

    let mut keys: Vec<PublicKey> = Vec::with_capacity(recipients.len());
    for hex in recipients {
        let key = PublicKey::from_hex(hex)?;
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    if keys.len() > limits.max_recipients {
        return Err(Error::TooManyRecipients {
            count: keys.len(),
            limit: limits.max_recipients,
        }
        .into());
    }

    let envelope = Envelope::seal(&payload, &keys)?;
    info!(recipients = envelope.wrapped_keys().len(), "Sealed payload");
    Ok(Outcome::ok(serde_json::to_value(&envelope)?))
}

pub fn open(envelope: &Path, key: &Path) -> anyhow::Result<Outcome> {
    let envelope: Envelope = read_json(envelope)?;
    let keypair = KeyPair::load_from_file(key)?;
    Ok(Outcome::ok(envelope.open(&keypair)?))
}
