//! # Factom Client Submit
//!
//! The commit/reveal protocol that gets chains and entries onto a Factom
//! network, and the backends it talks to.
//!
//! ## Overview
//!
//! Writing an entry takes two messages. The commit pays entry credits for
//! the entry's hash, the reveal then publishes the entry itself. A
//! [`Submitter`] runs both for each submission, waits for the network to
//! acknowledge the entry, and optionally waits for the directory block that
//! confirms it.
//!
//! ## Key Properties
//!
//! - **Bounded**: at most `max_concurrent` submissions run at once; further
//!   callers wait for a slot
//! - **Observable**: every phase result goes to the submission's observers
//! - **Cancellable**: a cancelled submission stops before its next phase
//! - **Timeouts are results**: polling that runs out reports the last status
//!   seen instead of failing
//!
//! ## Message Flow
//!
//! ```text
//! Client                     walletd                    factomd
//!   |--- compose ------------->|                          |
//!   |<-- commit + reveal ------|                          |
//!   |--- commit-chain / commit-entry -------------------->|
//!   |<-- txid, entry hash --------------------------------|
//!   |        (settle delay)                               |
//!   |--- reveal-chain / reveal-entry -------------------->|
//!   |<-- entry hash, chain id ----------------------------|
//!   |--- ack (every interval, until timeout) ------------>|
//!   |<-- TransactionACK / DBlockConfirmed ----------------|
//! ```
//!
//! With an offline [`Composer`] the walletd leg is replaced by local signing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use factom_client_submit::{Composer, MemoryNode, ObserverSet, SubmitConfig, Submitter};
//!
//! async fn example() {
//!     let node = Arc::new(MemoryNode::new());
//!     let submitter = Submitter::new(node.clone(), Composer::online(node), SubmitConfig::default());
//!
//!     // let handle = submitter.submit_chain(chain, payer, false, ObserverSet::default()).await?;
//!     // let result = handle.await?;
//!     // println!("entry {} acknowledged: {}", result.entry_hash, result.is_acknowledged());
//! }
//! ```

pub mod backend;
pub mod compose;
pub mod config;
pub mod error;
pub mod observer;
pub mod poll;
pub mod pool;
pub mod protocol;
pub mod responses;
pub mod state;

pub use backend::{memory::MemoryNode, memory::NodeCall, ComposeBackend, NodeBackend};
pub use compose::Composer;
pub use config::{SubmitConfig, DEFAULT_MAX_CONCURRENT};
pub use error::{
    BackendError, BackendResult, Result, SubmitError, INVALID_PARAMS_CODE, REPEATED_COMMIT_CODE,
};
pub use observer::{ObserverSet, SubmissionObserver};
pub use poll::{poll_ack_status, PollConfig, PollOutcome, ACK_TARGETS, CONFIRM_TARGETS};
pub use pool::WorkerPool;
pub use protocol::{Submission, SubmissionHandle, SubmissionResult, Submitter};
pub use responses::{
    AckResponse, AckStatus, CommitChainResponse, CommitEntryResponse, CommitResponse,
    ComposedPayloads, EntryBlock, EntryBlockEntry, EntryBlockHeader, RevealResponse,
};
pub use state::{SubmissionKind, SubmissionPhase, SubmissionState};
