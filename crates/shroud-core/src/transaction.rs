//! Confidential transaction service.
//!
//! Ties the primitives together: a payload is sealed for its recipients,
//! committed, signed by the sender and anchored on a [`Ledger`]. The sealed
//! transaction travels off-chain; only the commitment hash and the disclosure
//! root reach the ledger. Both are also signed by the sender.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use shroud_crypto::{
    Commitment, Envelope, KeyPair, PublicKey, build_tree_for, canonical_bytes, commit,
    sign_commitment, verify_commitment_signature,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ledger::{CommitmentRecord, Ledger, LedgerReceipt};

/// What a sender asks to be sealed and anchored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub payload: Value,
    pub domain_id: String,
    pub tx_type: String,
    pub recipients: Vec<PublicKey>,
}

/// A sealed, committed, signed and anchored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedTransaction {
    pub id: String,
    pub domain_id: String,
    pub tx_type: String,
    pub sender: PublicKey,
    pub envelope: Envelope,
    pub commitment: Commitment,
    /// Present only when the payload is a JSON object.
    pub disclosure_root: Option<String>,
    /// Sender's signature over the commitment hash.
    pub signature: String,
    /// Sender's signature over the disclosure root, present with the root.
    #[serde(default)]
    pub root_signature: Option<String>,
    pub receipt: LedgerReceipt,
    /// Unix seconds.
    pub created_at: i64,
}

/// Outcome of checking a transaction against its signer and the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAudit {
    pub signature_valid: bool,
    pub anchored: bool,
    /// The disclosure root is signed by the sender and matches the anchored one.
    pub root_valid: bool,
}

impl TransactionAudit {
    pub const fn is_valid(&self) -> bool {
        self.signature_valid && self.anchored && self.root_valid
    }
}

/// Whether `tx` carries a disclosure root signed by its sender, or neither a
/// root nor a root signature.
pub(crate) fn root_signature_valid(tx: &SealedTransaction) -> bool {
    match (&tx.disclosure_root, &tx.root_signature) {
        (Some(root), Some(signature)) => verify_commitment_signature(root, signature, &tx.sender),
        (None, None) => true,
        _ => false,
    }
}

/// Seals, anchors, opens and audits confidential transactions.
#[derive(Debug, Clone)]
pub struct TransactionService<L: Ledger> {
    ledger: L,
    config: Config,
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

impl<L: Ledger> TransactionService<L> {
    pub const fn new(ledger: L, config: Config) -> Self {
        Self { ledger, config }
    }

    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Seal `request.payload` for its recipients and anchor the commitment.
    ///
    /// Limits are checked before any key material is generated.
    pub async fn submit(
        &self,
        sender: &KeyPair,
        request: TransactionRequest,
    ) -> Result<SealedTransaction> {
        let limits = &self.config.limits;

        let size = canonical_bytes(&request.payload).len();
        if size > limits.max_payload_bytes {
            return Err(Error::PayloadTooLarge {
                size,
                limit: limits.max_payload_bytes,
            });
        }

        let recipients = self.resolve_recipients(sender, request.recipients);
        if recipients.len() > limits.max_recipients {
            return Err(Error::TooManyRecipients {
                count: recipients.len(),
                limit: limits.max_recipients,
            });
        }

        let envelope = Envelope::seal(&request.payload, &recipients)?;
        let commitment = commit(&request.payload, None);
        let disclosure_root = build_tree_for(&request.payload)
            .ok()
            .map(|tree| tree.root);
        let signature = sign_commitment(&commitment.hash, sender)?;
        // The root is a 32-byte digest in the same form as a commitment hash.
        let root_signature = disclosure_root
            .as_deref()
            .map(|root| sign_commitment(root, sender))
            .transpose()?;

        let id = uuid::Uuid::new_v4().to_string();
        let receipt = self
            .ledger
            .record_commitment(CommitmentRecord {
                id: id.clone(),
                hash: commitment.hash.clone(),
                disclosure_root: disclosure_root.clone(),
                domain_id: request.domain_id.clone(),
                recipient_fingerprints: envelope.recipient_fingerprints(),
                tx_type: request.tx_type.clone(),
            })
            .await?;

        info!(
            %id,
            domain = %request.domain_id,
            tx_type = %request.tx_type,
            recipients = recipients.len(),
            block = receipt.block_number,
            "Submitted confidential transaction"
        );

        Ok(SealedTransaction {
            id,
            domain_id: request.domain_id,
            tx_type: request.tx_type,
            sender: *sender.public_key(),
            envelope,
            commitment,
            disclosure_root,
            signature,
            root_signature,
            receipt,
            created_at: unix_timestamp(),
        })
    }

    /// Recipient set in request order with duplicates removed, plus the sender
    /// when configured.
    fn resolve_recipients(&self, sender: &KeyPair, requested: Vec<PublicKey>) -> Vec<PublicKey> {
        let mut recipients: Vec<PublicKey> = Vec::with_capacity(requested.len() + 1);
        let extra = self
            .config
            .envelope
            .include_sender
            .then_some(*sender.public_key());
        for key in requested.into_iter().chain(extra) {
            if !recipients.contains(&key) {
                recipients.push(key);
            }
        }
        recipients
    }

    /// Decrypt a transaction and check the plaintext against its commitment.
    pub fn open(&self, tx: &SealedTransaction, recipient: &KeyPair) -> Result<Value> {
        let payload = tx.envelope.open(recipient)?;
        if !tx.commitment.opens_to(&payload) {
            warn!(id = %tx.id, "Decrypted payload does not open its commitment");
            return Err(Error::CommitmentMismatch {
                hash: tx.commitment.hash.clone(),
            });
        }
        debug!(id = %tx.id, fingerprint = %recipient.fingerprint(), "Opened transaction");
        Ok(payload)
    }

    /// Check the sender's signatures and whether the ledger holds the
    /// commitment hash and disclosure root.
    pub async fn audit(&self, tx: &SealedTransaction) -> Result<TransactionAudit> {
        let signature_valid =
            verify_commitment_signature(&tx.commitment.hash, &tx.signature, &tx.sender);
        let anchored = self
            .ledger
            .verify_commitment(&tx.id, &tx.commitment.hash)
            .await?;
        let root_valid = root_signature_valid(tx)
            && self
                .ledger
                .verify_disclosure_root(&tx.id, tx.disclosure_root.as_deref())
                .await?;
        if !root_valid {
            warn!(id = %tx.id, "Disclosure root is not the signed, anchored one");
        }
        debug!(id = %tx.id, signature_valid, anchored, root_valid, "Audited transaction");
        Ok(TransactionAudit {
            signature_valid,
            anchored,
            root_valid,
        })
    }
}
