//! Submission phases and state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A step of the submission protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionPhase {
    Compose,
    Commit,
    Wait,
    Reveal,
    Acknowledge,
    Confirm,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compose => "compose",
            Self::Commit => "commit",
            Self::Wait => "wait",
            Self::Reveal => "reveal",
            Self::Acknowledge => "acknowledge",
            Self::Confirm => "confirm",
        };
        f.write_str(name)
    }
}

/// Where a submission currently is.
///
/// States advance strictly in declaration order; `Succeeded` and `Failed`
/// are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    /// Waiting for a worker slot or for compose to start.
    Pending,
    Composed,
    Committed,
    Waiting,
    Revealed,
    Acknowledged,
    Confirmed,
    Succeeded,
    Failed(String),
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

/// What is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionKind {
    Chain,
    Entry,
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chain => f.write_str("chain"),
            Self::Entry => f.write_str("entry"),
        }
    }
}
