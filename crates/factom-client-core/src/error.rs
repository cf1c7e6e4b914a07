//! Error types for the Factom client core.

use thiserror::Error;

/// Errors raised by the codecs and key handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("assertion failed: {0}")]
    AssertionError(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Validation errors for caller supplied entries, chains and payers.
///
/// These are never retried: they describe malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("entry payload of {size} bytes exceeds the maximum of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("external id of {0} bytes cannot be length prefixed")]
    ExtIdTooLong(usize),

    #[error("a new chain needs at least one external id")]
    MissingChainExtIds,

    #[error("chain id {expected} does not match external ids (derived {derived})")]
    ChainIdMismatch { expected: String, derived: String },

    #[error("malformed entry: {0}")]
    MalformedEntry(String),

    #[error("malformed commit: {0}")]
    MalformedCommit(String),

    #[error("commit signature verification failed")]
    SignatureFailed,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error(transparent)]
    Core(#[from] CoreError),
}
