//! Ledger interface for anchoring commitment hashes.
//!
//! The confidential layer never writes payloads to the ledger. A ledger only
//! sees a [`CommitmentRecord`]: the transaction id, the commitment hash, the
//! disclosure root and the routing metadata needed to find the envelope again.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

/// Errors surfaced by a ledger backend.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("commitment already recorded for transaction {0}")]
    DuplicateRecord(String),

    /// Raised by backends that reach a ledger over the network.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// What gets anchored on-chain for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentRecord {
    pub id: String,
    pub hash: String,
    /// Root over the payload's fields, when the payload is an object.
    #[serde(default)]
    pub disclosure_root: Option<String>,
    pub domain_id: String,
    pub recipient_fingerprints: Vec<String>,
    pub tx_type: String,
}

/// Proof of inclusion returned by the ledger after recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}

/// A public ledger that stores commitment hashes.
#[async_trait]
pub trait Ledger: Send + Sync + Debug + 'static {
    /// Anchor a commitment. Each transaction id may be recorded once.
    async fn record_commitment(&self, record: CommitmentRecord)
    -> Result<LedgerReceipt, LedgerError>;

    /// Whether `hash` is the commitment recorded under `id`.
    async fn verify_commitment(&self, id: &str, hash: &str) -> Result<bool, LedgerError>;

    /// Whether `root` is the disclosure root recorded under `id`. `None`
    /// matches only a record that was anchored without a root.
    async fn verify_disclosure_root(
        &self,
        id: &str,
        root: Option<&str>,
    ) -> Result<bool, LedgerError>;
}

/// In-process ledger backed by a map. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<RwLock<MemoryLedgerInner>>,
}

#[derive(Debug, Default)]
struct MemoryLedgerInner {
    records: HashMap<String, (CommitmentRecord, LedgerReceipt)>,
    height: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commitments recorded so far.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }

    /// The record and receipt stored under `id`, if any.
    pub async fn get(&self, id: &str) -> Option<(CommitmentRecord, LedgerReceipt)> {
        self.inner.read().await.records.get(id).cloned()
    }
}

/// Each variable-length field is prefixed with its u32 big-endian length.
fn tx_hash(block_number: u64, id: &str, hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(block_number.to_be_bytes());
    for field in [id, hash] {
        hasher.update(u32::try_from(field.len()).unwrap_or(u32::MAX).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    format!("0x{}", hex::encode(hasher.finalize()))
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn record_commitment(
        &self,
        record: CommitmentRecord,
    ) -> Result<LedgerReceipt, LedgerError> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&record.id) {
            return Err(LedgerError::DuplicateRecord(record.id));
        }

        inner.height += 1;
        let receipt = LedgerReceipt {
            tx_hash: tx_hash(inner.height, &record.id, &record.hash),
            block_number: inner.height,
        };
        tracing::debug!(
            id = %record.id,
            block = receipt.block_number,
            "Recorded commitment"
        );
        inner
            .records
            .insert(record.id.clone(), (record, receipt.clone()));
        Ok(receipt)
    }

    async fn verify_commitment(&self, id: &str, hash: &str) -> Result<bool, LedgerError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .get(id)
            .is_some_and(|(record, _)| record.hash.eq_ignore_ascii_case(hash)))
    }

    async fn verify_disclosure_root(
        &self,
        id: &str,
        root: Option<&str>,
    ) -> Result<bool, LedgerError> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(id).is_some_and(|(record, _)| {
            match (record.disclosure_root.as_deref(), root) {
                (Some(recorded), Some(claimed)) => recorded.eq_ignore_ascii_case(claimed),
                (None, None) => true,
                _ => false,
            }
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn record(id: &str, hash: &str) -> CommitmentRecord {
        CommitmentRecord {
            id: id.to_string(),
            hash: hash.to_string(),
            disclosure_root: Some("0xaa".to_string()),
            domain_id: "trade-finance".to_string(),
            recipient_fingerprints: vec!["ab".repeat(20)],
            tx_type: "deal".to_string(),
        }
    }

    #[tokio::test]
    async fn blocks_are_numbered_from_one() {
        let ledger = MemoryLedger::new();
        let first = ledger.record_commitment(record("a", "0x01")).await.unwrap();
        let second = ledger.record_commitment(record("b", "0x02")).await.unwrap();

        assert_eq!(first.block_number, 1);
        assert_eq!(second.block_number, 2);
        assert_ne!(first.tx_hash, second.tx_hash);
        assert!(first.tx_hash.starts_with("0x"));
        assert_eq!(first.tx_hash.len(), 66);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let ledger = MemoryLedger::new();
        ledger.record_commitment(record("a", "0x01")).await.unwrap();

        let err = ledger
            .record_commitment(record("a", "0x02"))
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateRecord("a".to_string()));
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn verify_matches_hash_case_insensitively() {
        let ledger = MemoryLedger::new();
        ledger
            .record_commitment(record("a", "0xabcdef"))
            .await
            .unwrap();

        assert!(ledger.verify_commitment("a", "0xABCDEF").await.unwrap());
        assert!(!ledger.verify_commitment("a", "0xabcde0").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_id_does_not_verify() {
        let ledger = MemoryLedger::new();
        assert!(ledger.is_empty().await);
        assert!(!ledger.verify_commitment("missing", "0x01").await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let ledger = MemoryLedger::new();
        let other = ledger.clone();
        other.record_commitment(record("a", "0x01")).await.unwrap();

        let (stored, receipt) = ledger.get("a").await.unwrap();
        assert_eq!(stored.tx_type, "deal");
        assert_eq!(receipt.block_number, 1);
    }

    #[test]
    fn tx_hash_separates_id_from_hash() {
        assert_ne!(tx_hash(1, "ab", "c"), tx_hash(1, "a", "bc"));
        assert_ne!(tx_hash(1, "", "abc"), tx_hash(1, "abc", ""));
        assert_eq!(tx_hash(7, "a", "bc"), tx_hash(7, "a", "bc"));
    }

    #[tokio::test]
    async fn disclosure_root_must_match_the_anchored_one() {
        let ledger = MemoryLedger::new();
        ledger.record_commitment(record("a", "0x01")).await.unwrap();
        let mut rootless = record("b", "0x02");
        rootless.disclosure_root = None;
        ledger.record_commitment(rootless).await.unwrap();

        assert!(ledger.verify_disclosure_root("a", Some("0xAA")).await.unwrap());
        assert!(!ledger.verify_disclosure_root("a", Some("0xbb")).await.unwrap());
        assert!(!ledger.verify_disclosure_root("a", None).await.unwrap());
        assert!(ledger.verify_disclosure_root("b", None).await.unwrap());
        assert!(!ledger.verify_disclosure_root("b", Some("0xaa")).await.unwrap());
        assert!(!ledger.verify_disclosure_root("missing", None).await.unwrap());
    }
}
