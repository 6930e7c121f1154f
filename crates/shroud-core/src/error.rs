//! Error types for the Shroud core library.

use thiserror::Error;

use crate::ledger::LedgerError;

/// Result type alias using the Shroud `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Shroud operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Cryptographic failure from the envelope/commitment layer
    #[error(transparent)]
    Crypto(#[from] shroud_crypto::CryptoError),

    /// The ledger rejected or could not record a commitment
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Canonical payload exceeds the configured limit
    #[error("Payload is {size} bytes, limit is {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Recipient set exceeds the configured limit
    #[error("{count} recipients requested, limit is {limit}")]
    TooManyRecipients { count: usize, limit: usize },

    /// A decrypted payload does not open the recorded commitment
    #[error("Decrypted payload does not match commitment {hash}")]
    CommitmentMismatch { hash: String },

    /// The decrypted payload does not hash to the transaction's disclosure root
    #[error("Payload fields do not match disclosure root {expected}")]
    DisclosureRootMismatch { expected: String },

    /// The transaction payload was not an object, so no fields can be disclosed
    #[error("Transaction {0} has no disclosure root")]
    NotDisclosable(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
