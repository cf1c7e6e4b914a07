//! Backend abstractions for the node and the wallet.
//!
//! The JSON-RPC transport lives outside this crate. Implementations of these
//! traits carry requests to `factomd` (node) and `walletd` (compose), or, in
//! the case of [`memory::MemoryNode`], answer them in process.

use async_trait::async_trait;

use factom_client_core::{Address, Chain, ChainId, Entry, EntryHash};

use crate::error::BackendResult;
use crate::responses::{
    AckResponse, CommitChainResponse, CommitEntryResponse, ComposedPayloads, EntryBlock,
    RevealResponse,
};

pub mod memory;

/// Builds signed commit and reveal payloads for a payer address.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ComposeBackend: Send + Sync {
    async fn compose_chain(&self, chain: &Chain, ec_address: &Address)
        -> BackendResult<ComposedPayloads>;

    async fn compose_entry(&self, entry: &Entry, ec_address: &Address)
        -> BackendResult<ComposedPayloads>;
}

/// Submits payloads to a node and reads chain data back.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait NodeBackend: Send + Sync {
    /// Submit a signed chain commit.
    async fn commit_chain(&self, message: &[u8]) -> BackendResult<CommitChainResponse>;

    /// Submit a signed entry commit.
    async fn commit_entry(&self, message: &[u8]) -> BackendResult<CommitEntryResponse>;

    /// Reveal a marshalled entry whose commit was already accepted.
    async fn reveal(&self, entry: &[u8]) -> BackendResult<RevealResponse>;

    /// Current acknowledgement level of a revealed entry.
    async fn ack_status(&self, entry_hash: &EntryHash, chain_id: &ChainId)
        -> BackendResult<AckResponse>;

    /// All entry blocks of a chain, in whatever order the node walks them.
    async fn entry_blocks_for_chain(&self, chain_id: &ChainId) -> BackendResult<Vec<EntryBlock>>;

    /// Fetch an entry by hash.
    async fn entry_by_hash(&self, entry_hash: &EntryHash) -> BackendResult<Entry>;
}
