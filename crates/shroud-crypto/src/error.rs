//! Crypto error types.

/// Errors from cryptographic operations.
///
/// Verification failures (commitment, disclosure root, signature) are not
/// represented here: those operations return `false`.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Envelope requires at least one recipient")]
    NoRecipients,

    #[error("No wrapped key for recipient {fingerprint}")]
    NotAuthorized { fingerprint: String },

    /// Tag verification failed while unwrapping the data key or decrypting
    /// the payload. Both stages report this same variant.
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Payload is not a JSON object")]
    NotAnObject,

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
