//! Shroud core library.
//!
//! Configuration, logging setup, the ledger interface and the confidential
//! transaction services built on `shroud-crypto`.

pub mod config;
pub mod disclosure;
pub mod error;
pub mod ledger;
pub mod tracing_init;
pub mod transaction;

pub use config::Config;
pub use disclosure::{DisclosurePackage, verify_package};
pub use error::{Error, Result};
pub use ledger::{CommitmentRecord, Ledger, LedgerError, LedgerReceipt, MemoryLedger};
pub use transaction::{SealedTransaction, TransactionAudit, TransactionRequest, TransactionService};
