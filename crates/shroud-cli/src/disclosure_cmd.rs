//! Disclosure subcommands: disclose, verify-disclosure.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::{Value, json};

use shroud_crypto::{CryptoError, Disclosure, build_tree};

use crate::Outcome;
use crate::input::read_json;

pub fn disclose(payload: &Path, fields: Vec<String>) -> anyhow::Result<Outcome> {
    let payload: Value = read_json(payload)?;
    let object = payload.as_object().ok_or(CryptoError::NotAnObject)?;
    let names: BTreeSet<String> = fields.into_iter().collect();

    let root = build_tree(object).root;
    let disclosure = shroud_crypto::disclose(object, &names)?;
    Ok(Outcome::ok(json!({
        "root": root,
        "disclosure": disclosure,
    })))
}

/// Accepts either a bare disclosure or the `{root, disclosure}` document
/// printed by `disclose`.
pub fn verify(disclosure: &Path, root: &str) -> anyhow::Result<Outcome> {
    let doc: Value = read_json(disclosure)?;
    let body = doc.get("disclosure").cloned().unwrap_or(doc);
    let disclosure: Disclosure = serde_json::from_value(body)?;
    Ok(Outcome::verdict(disclosure.verify(root)))
}
