//! Two counterparties settle a deal through the service; an auditor later
//! receives the amount only.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::collections::BTreeSet;

use serde_json::json;

use shroud_core::{
    Config, DisclosurePackage, Error, Ledger, MemoryLedger, SealedTransaction,
    TransactionRequest, TransactionService, verify_package,
};
use shroud_crypto::{CryptoError, KeyPair, build_tree_for, disclose};

fn deal_request(buyer: &KeyPair) -> TransactionRequest {
    TransactionRequest {
        payload: json!({"amount": 500_000, "buyer": "Acme", "currency": "USD"}),
        domain_id: "trade-finance".into(),
        tx_type: "deal".into(),
        recipients: vec![*buyer.public_key()],
    }
}

#[tokio::test]
async fn counterparties_open_outsider_is_refused() {
    let svc = TransactionService::new(MemoryLedger::new(), Config::default());
    let seller = KeyPair::generate();
    let buyer = KeyPair::generate();
    let outsider = KeyPair::generate();

    let tx = svc.submit(&seller, deal_request(&buyer)).await.unwrap();

    let for_seller = svc.open(&tx, &seller).unwrap();
    let for_buyer = svc.open(&tx, &buyer).unwrap();
    assert_eq!(for_seller, for_buyer);
    assert_eq!(for_buyer["amount"], json!(500_000));

    assert!(matches!(
        svc.open(&tx, &outsider),
        Err(Error::Crypto(CryptoError::NotAuthorized { .. }))
    ));
}

#[tokio::test]
async fn auditor_checks_amount_without_seeing_buyer() {
    let svc = TransactionService::new(MemoryLedger::new(), Config::default());
    let seller = KeyPair::generate();
    let buyer = KeyPair::generate();

    let tx = svc.submit(&seller, deal_request(&buyer)).await.unwrap();
    let package = svc.disclose(&tx, &buyer, ["amount"]).unwrap();

    // The auditor receives the transaction metadata and the package over the wire.
    let wire_tx = serde_json::to_string(&tx).unwrap();
    let wire_pkg = serde_json::to_string(&package).unwrap();
    assert!(!wire_pkg.contains("Acme"));

    let tx: SealedTransaction = serde_json::from_str(&wire_tx).unwrap();
    let package = serde_json::from_str(&wire_pkg).unwrap();
    assert!(verify_package(&package, &tx));

    let audit = svc.audit(&tx).await.unwrap();
    assert!(audit.signature_valid);
    assert!(audit.anchored);
    assert!(audit.root_valid);
    assert!(svc.check_package(&package, &tx).await.unwrap());
}

#[tokio::test]
async fn auditor_rejects_an_amount_under_a_substituted_root() {
    let svc = TransactionService::new(MemoryLedger::new(), Config::default());
    let seller = KeyPair::generate();
    let buyer = KeyPair::generate();
    let tx = svc.submit(&seller, deal_request(&buyer)).await.unwrap();

    // The buyer reveals a lower amount from a payload they made up.
    let made_up = json!({"amount": 1, "buyer": "Acme", "currency": "USD"});
    let names: BTreeSet<String> = ["amount".to_string()].into();
    let root = build_tree_for(&made_up).unwrap().root;
    let package = DisclosurePackage {
        transaction_id: tx.id.clone(),
        root: root.clone(),
        disclosure: disclose(made_up.as_object().unwrap(), &names).unwrap(),
    };
    let mut presented = tx.clone();
    presented.disclosure_root = Some(root);

    assert!(!verify_package(&package, &presented));
    assert!(!svc.audit(&presented).await.unwrap().is_valid());
    assert!(!svc.check_package(&package, &presented).await.unwrap());
    assert!(!svc.check_package(&package, &tx).await.unwrap());
}

#[tokio::test]
async fn ledger_holds_only_the_hash() {
    let ledger = MemoryLedger::new();
    let svc = TransactionService::new(ledger.clone(), Config::default());
    let seller = KeyPair::generate();
    let buyer = KeyPair::generate();

    let tx = svc.submit(&seller, deal_request(&buyer)).await.unwrap();

    let (record, receipt) = ledger.get(&tx.id).await.unwrap();
    assert_eq!(record.hash, tx.commitment.hash);
    assert_eq!(receipt, tx.receipt);
    assert_eq!(record.recipient_fingerprints.len(), 2);
    assert!(record.recipient_fingerprints.contains(&buyer.fingerprint()));
    assert_eq!(record.disclosure_root, tx.disclosure_root);

    let stored = serde_json::to_string(&record).unwrap();
    assert!(!stored.contains("500000"));
    assert!(!stored.contains("Acme"));
    assert!(ledger.verify_commitment(&tx.id, &tx.commitment.hash).await.unwrap());
}

#[tokio::test]
async fn concurrent_submissions_get_distinct_blocks() {
    let ledger = MemoryLedger::new();
    let svc = std::sync::Arc::new(TransactionService::new(ledger.clone(), Config::default()));
    let buyer = KeyPair::generate();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let svc = svc.clone();
        let request = deal_request(&buyer);
        handles.push(tokio::spawn(async move {
            let seller = KeyPair::generate();
            svc.submit(&seller, request).await.unwrap()
        }));
    }

    let mut blocks = Vec::new();
    for handle in handles {
        blocks.push(handle.await.unwrap().receipt.block_number);
    }
    blocks.sort_unstable();
    assert_eq!(blocks, (1..=8).collect::<Vec<u64>>());
    assert_eq!(ledger.len().await, 8);
}
