//! Error types for the submit module.

use thiserror::Error;

use factom_client_core::{CoreError, ValidationError};

use crate::state::SubmissionPhase;

/// JSON-RPC error code a node returns for a commit it has already seen.
pub const REPEATED_COMMIT_CODE: i64 = -32011;

/// JSON-RPC error code for rejected parameters.
pub const INVALID_PARAMS_CODE: i64 = -32602;

/// Errors reported by a node or compose backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend answered with an RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The backend could not be reached or answered garbage.
    #[error("transport error: {0}")]
    Transport(String),

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl BackendError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Whether this is a node rejecting a commit it already holds.
    ///
    /// Nodes have used both the error code and the message text for this.
    pub fn is_repeated_commit(&self) -> bool {
        match self {
            Self::Rpc { code, message } => {
                *code == REPEATED_COMMIT_CODE
                    || message.to_ascii_lowercase().contains("repeated commit")
            }
            _ => false,
        }
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors that end a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The chain or entry is malformed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The payer address has the wrong shape.
    #[error("address error: {0}")]
    Address(#[from] CoreError),

    /// The compose backend rejected the submission.
    #[error("compose failed: {0}")]
    Compose(#[source] BackendError),

    /// The node rejected or failed the commit.
    #[error("commit failed: {0}")]
    Commit(#[source] BackendError),

    /// The node rejected or failed the reveal.
    #[error("reveal failed: {0}")]
    Reveal(#[source] BackendError),

    /// The submission was cancelled before this phase started.
    #[error("submission cancelled before {0}")]
    Cancelled(SubmissionPhase),

    /// The worker pool has shut down.
    #[error("worker pool closed")]
    PoolClosed,

    /// The submission task panicked or was aborted.
    #[error("submission task failed: {0}")]
    TaskFailed(String),
}

/// Result type for submit operations.
pub type Result<T> = std::result::Result<T, SubmitError>;
