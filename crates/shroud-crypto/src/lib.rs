//! Shroud confidentiality primitives.
//!
//! Transaction payloads are encrypted off-chain for a set of recipients while
//! only a commitment hash is anchored on a public ledger.
//!
//! ## Crypto primitives
//!
//! - **Identity**: secp256k1 key pair per party, routed by a 20-byte SHA-256 fingerprint
//! - **Envelope**: random DEK, AES-256-GCM payload encryption, DEK wrapped per recipient
//!   via ephemeral ECDH → SHA-256 → AES-256-GCM
//! - **Commitment**: domain-separated SHA-256 over canonical JSON and a 32-byte nonce
//! - **Disclosure**: per-field leaf digests with an order-independent root
//! - **Signatures**: deterministic ECDSA (secp256k1, SHA-256, DER) over commitment hashes
//!
//! Every operation is a synchronous function of its inputs plus fresh OS
//! randomness; nothing here holds shared state.

pub mod commitment;
pub mod disclosure;
pub mod envelope;
pub mod error;
pub mod exchange;
pub mod keys;
pub mod payload;
pub mod signing;
pub mod symmetric;

pub use commitment::{Commitment, commit};
pub use disclosure::{
    Disclosure, DisclosureTree, build_tree, build_tree_for, disclose, verify_disclosure,
};
pub use envelope::{Envelope, WrappedKey, create_envelope, open_envelope};
pub use error::CryptoError;
pub use keys::{KeyPair, PublicKey, fingerprint, fingerprint_of};
pub use payload::{Payload, canonical_bytes, canonical_json};
pub use signing::{sign, sign_commitment, verify_commitment_signature};
pub use symmetric::{DataKey, SealedBytes};
