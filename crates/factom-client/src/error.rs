//! Error types for the client.

use factom_client_core::{ChainId, CoreError, ValidationError};
use factom_client_identity::IdentityError;
use factom_client_submit::{BackendError, SubmitError};
use thiserror::Error;

/// Errors that can occur during client operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Malformed chain, entry or payer.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Address or key error.
    #[error("address error: {0}")]
    Address(#[from] CoreError),

    /// Submission error.
    #[error("submission error: {0}")]
    Submit(#[from] SubmitError),

    /// Identity chain or identifier error.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Node error outside a submission.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The identity's chain could not be read.
    #[error("cannot resolve identity {chain_id}: {reason}")]
    IdentityResolution { chain_id: ChainId, reason: String },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
