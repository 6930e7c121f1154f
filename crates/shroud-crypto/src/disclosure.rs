//! Field-level selective disclosure.
//!
//! Each top-level field of a payload becomes a leaf digest:
//!
//! ```text
//! leaf = SHA-256(0x00 || u32_be(len(name)) || name || canonical_json(value))
//! root = SHA-256(sorted(leaf_1 .. leaf_n) concatenated)
//! ```
//!
//! This is a flat, order-independent commitment over the whole leaf set, not
//! a log-depth Merkle tree: a disclosure carries every withheld leaf digest,
//! so the verifier rebuilds exactly the set hashed at build time. An empty
//! payload has the root SHA-256("").

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::commitment::{HASH_SIZE, decode_digest};
use crate::error::CryptoError;
use crate::payload::canonical_bytes;

/// Prefix byte for leaf hashes.
const LEAF_TAG: u8 = 0x00;

type Digest32 = [u8; HASH_SIZE];

/// Leaf digests for every field plus the root over them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureTree {
    /// `0x`-prefixed root digest.
    pub root: String,
    /// Lowercase hex leaf digest per field name.
    pub leaves: BTreeMap<String, String>,
}

/// Revealed fields plus the digests of everything withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disclosure {
    pub disclosed_values: BTreeMap<String, Value>,
    /// Withheld leaf digests in ascending order.
    pub proof: Vec<String>,
}

/// Hash every field of `fields` and derive the root.
pub fn build_tree(fields: &Map<String, Value>) -> DisclosureTree {
    let leaves: BTreeMap<String, Digest32> = fields
        .iter()
        .map(|(name, value)| (name.clone(), leaf_digest(name, value)))
        .collect();
    let root = root_of(leaves.values().copied().collect());
    DisclosureTree {
        root: format!("0x{}", hex::encode(root)),
        leaves: leaves
            .into_iter()
            .map(|(name, digest)| (name, hex::encode(digest)))
            .collect(),
    }
}

/// [`build_tree`] over a payload that must be a JSON object.
pub fn build_tree_for(payload: &Value) -> Result<DisclosureTree, CryptoError> {
    payload
        .as_object()
        .map(build_tree)
        .ok_or(CryptoError::NotAnObject)
}

/// Reveal the fields named in `disclosed` and withhold the rest as digests.
///
/// Fails with [`CryptoError::UnknownField`] if a name is not in `fields`.
pub fn disclose(
    fields: &Map<String, Value>,
    disclosed: &BTreeSet<String>,
) -> Result<Disclosure, CryptoError> {
    if let Some(missing) = disclosed.iter().find(|name| !fields.contains_key(*name)) {
        return Err(CryptoError::UnknownField(missing.clone()));
    }

    let mut disclosed_values = BTreeMap::new();
    let mut withheld = Vec::new();
    for (name, value) in fields {
        if disclosed.contains(name) {
            disclosed_values.insert(name.clone(), value.clone());
        } else {
            withheld.push(leaf_digest(name, value));
        }
    }
    withheld.sort_unstable();

    Ok(Disclosure {
        disclosed_values,
        proof: withheld.into_iter().map(hex::encode).collect(),
    })
}

/// Recompute the root from the revealed values and withheld digests and
/// compare it with `expected_root`.
///
/// Returns `false` for a substituted value, a missing or extra digest, or any
/// malformed hex.
pub fn verify_disclosure(
    disclosed_values: &BTreeMap<String, Value>,
    proof: &[String],
    expected_root: &str,
) -> bool {
    let Some(expected) = decode_digest(expected_root) else {
        return false;
    };

    let mut leaves: Vec<Digest32> = disclosed_values
        .iter()
        .map(|(name, value)| leaf_digest(name, value))
        .collect();
    for digest in proof {
        match decode_digest(digest) {
            Some(d) => leaves.push(d),
            None => return false,
        }
    }

    root_of(leaves)[..].ct_eq(&expected[..]).into()
}

impl Disclosure {
    /// Check this disclosure against a root.
    pub fn verify(&self, expected_root: &str) -> bool {
        verify_disclosure(&self.disclosed_values, &self.proof, expected_root)
    }
}

fn leaf_digest(name: &str, value: &Value) -> Digest32 {
    // Field names are bounded by payload size limits well below u32::MAX.
    let name_len = u32::try_from(name.len()).unwrap_or(u32::MAX);
    let mut hasher = Sha256::new();
    hasher.update([LEAF_TAG]);
    hasher.update(name_len.to_be_bytes());
    hasher.update(name.as_bytes());
    hasher.update(canonical_bytes(value));
    finish(hasher)
}

fn root_of(mut leaves: Vec<Digest32>) -> Digest32 {
    leaves.sort_unstable();
    let mut hasher = Sha256::new();
    for leaf in &leaves {
        hasher.update(leaf);
    }
    finish(hasher)
}

fn finish(hasher: Sha256) -> Digest32 {
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&hasher.finalize());
    out
}
