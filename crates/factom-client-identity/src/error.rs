//! Error types for the identity module.

use thiserror::Error;

/// Errors that abort an identity resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The chain's first entry is not an identity creation entry.
    #[error("malformed identity chain: {0}")]
    MalformedIdentityChain(String),

    /// The identifier is neither a DID nor a chain id.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A key handed to an entry builder has the wrong shape.
    #[error("invalid identity key: {0}")]
    InvalidKey(String),

    /// Entry construction failed.
    #[error("entry error: {0}")]
    Entry(#[from] factom_client_core::ValidationError),

    /// Core codec error.
    #[error("core error: {0}")]
    Core(#[from] factom_client_core::CoreError),
}

/// Why a single key replacement entry was skipped during reduction.
///
/// None of these abort the reduction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryRejection {
    #[error("malformed key replacement: {0}")]
    Malformed(String),

    #[error("invalid identity key {0}")]
    InvalidKey(String),

    #[error("signature verification failed")]
    SignatureVerificationFailure,

    #[error("old key is not an active key")]
    OldKeyNotActive,

    #[error("new key is already active")]
    NewKeyAlreadyActive,

    #[error("old and new key are identical")]
    SameKey,

    #[error("signer key is not an active key")]
    SignerNotActive,

    #[error("signer key cannot replace itself")]
    SignerIsOldKey,

    #[error("signer at index {signer_index} cannot replace key at index {old_index}")]
    InvalidKeyOrdering { signer_index: usize, old_index: usize },
}

/// Result type for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;
