//! Selective disclosure of committed transactions.
//!
//! A recipient opens a sealed transaction and reveals a chosen subset of its
//! fields to a third party, who checks them against the root the sender signed
//! and anchored at submission time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use shroud_crypto::{CryptoError, Disclosure, KeyPair, build_tree_for};

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::transaction::{SealedTransaction, TransactionService, root_signature_valid};

/// Fields revealed from one transaction, bound to its disclosure root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosurePackage {
    pub transaction_id: String,
    pub root: String,
    pub disclosure: Disclosure,
}

impl<L: Ledger> TransactionService<L> {
    /// Reveal `field_names` from a transaction the caller can open. The
    /// opened payload must rebuild the transaction's disclosure root.
    pub fn disclose<I, S>(
        &self,
        tx: &SealedTransaction,
        recipient: &KeyPair,
        field_names: I,
    ) -> Result<DisclosurePackage>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let root = tx
            .disclosure_root
            .clone()
            .ok_or_else(|| Error::NotDisclosable(tx.id.clone()))?;

        let payload = self.open(tx, recipient)?;
        let rebuilt = build_tree_for(&payload)?.root;
        if !rebuilt.eq_ignore_ascii_case(&root) {
            warn!(id = %tx.id, "Payload does not rebuild the disclosure root");
            return Err(Error::DisclosureRootMismatch { expected: root });
        }
        let fields = payload.as_object().ok_or(CryptoError::NotAnObject)?;
        let names: BTreeSet<String> = field_names.into_iter().map(Into::into).collect();
        let disclosure = shroud_crypto::disclose(fields, &names)?;

        info!(
            id = %tx.id,
            revealed = disclosure.disclosed_values.len(),
            withheld = disclosure.proof.len(),
            "Prepared disclosure"
        );

        Ok(DisclosurePackage {
            transaction_id: tx.id.clone(),
            root,
            disclosure,
        })
    }

    /// Check a package against its transaction and the transaction against
    /// the ledger. Unlike [`verify_package`], this catches a transaction whose
    /// sender was swapped along with a re-signed root.
    pub async fn check_package(
        &self,
        package: &DisclosurePackage,
        tx: &SealedTransaction,
    ) -> Result<bool> {
        Ok(verify_package(package, tx) && self.audit(tx).await?.is_valid())
    }
}

/// Check a package against the transaction it claims to come from. The
/// transaction's root must carry its sender's signature; use
/// [`TransactionService::check_package`] to also check it against the ledger.
pub fn verify_package(package: &DisclosurePackage, tx: &SealedTransaction) -> bool {
    package.transaction_id == tx.id
        && root_signature_valid(tx)
        && tx
            .disclosure_root
            .as_deref()
            .is_some_and(|root| root.eq_ignore_ascii_case(&package.root))
        && package.disclosure.verify(&package.root)
}
