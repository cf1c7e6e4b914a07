//! An in-memory node and wallet for tests and demos.
//!
//! [`MemoryNode`] checks commit signatures, welds and costs the way a node
//! does, files revealed entries into entry blocks, and reports
//! acknowledgement levels from a scripted schedule. Failures can be queued
//! per call to exercise error paths.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use factom_client_core::commit::{build_chain_commit, build_entry_commit, verify_commit};
use factom_client_core::encoding::sha256;
use factom_client_core::{
    Address, Chain, ChainId, Clock, Entry, EntryHash, KeyFamily, ParsedCommit, SystemClock,
    TxId, Visibility,
};

use super::{ComposeBackend, NodeBackend};
use crate::error::{BackendError, BackendResult, INVALID_PARAMS_CODE, REPEATED_COMMIT_CODE};
use crate::responses::{
    AckResponse, AckStatus, CommitChainResponse, CommitEntryResponse, ComposedPayloads,
    EntryBlock, EntryBlockEntry, EntryBlockHeader, RevealResponse,
};

/// Height of the first open block.
pub const GENESIS_HEIGHT: u64 = 1;

/// Block time of the first open block, seconds since the Unix epoch.
pub const GENESIS_TIME: u64 = 1_700_000_000;

/// Seconds between blocks.
pub const BLOCK_SECONDS: u64 = 600;

/// Calls a [`MemoryNode`] counts and can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCall {
    ComposeChain,
    ComposeEntry,
    CommitChain,
    CommitEntry,
    Reveal,
    AckStatus,
    EntryBlocks,
    EntryByHash,
}

#[derive(Debug, Clone, Copy)]
struct RevealedEntry {
    chain_id: ChainId,
    height: u64,
    ack_queries: usize,
}

struct NodeState {
    wallet: HashMap<String, Address>,
    pending_commits: HashMap<EntryHash, ParsedCommit>,
    entries: HashMap<EntryHash, Entry>,
    revealed: HashMap<EntryHash, RevealedEntry>,
    blocks: HashMap<ChainId, Vec<EntryBlock>>,
    height: u64,
    block_time: u64,
    ack_schedule: Vec<AckStatus>,
    failures: HashMap<NodeCall, VecDeque<BackendError>>,
    calls: HashMap<NodeCall, usize>,
}

impl NodeState {
    fn begin(&mut self, call: NodeCall) -> BackendResult<()> {
        *self.calls.entry(call).or_default() += 1;
        match self.failures.get_mut(&call).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn signing_key(&self, ec_address: &Address) -> BackendResult<Address> {
        if ec_address.family() != KeyFamily::EntryCredit {
            return Err(invalid_params(format!(
                "{} is not an entry credit address",
                ec_address.address_type()
            )));
        }
        match ec_address.visibility() {
            Visibility::Private => Ok(ec_address.clone()),
            Visibility::Public => self
                .wallet
                .get(ec_address.as_str())
                .cloned()
                .ok_or_else(|| invalid_params("wallet: address not found")),
        }
    }

    fn accept_commit(&mut self, message: &[u8], chain: bool) -> BackendResult<(ParsedCommit, TxId)> {
        let commit = verify_commit(message).map_err(|e| invalid_params(e.to_string()))?;
        if commit.is_chain_commit() != chain {
            return Err(invalid_params("commit kind does not match the call"));
        }
        if self.pending_commits.contains_key(&commit.entry_hash)
            || self.entries.contains_key(&commit.entry_hash)
        {
            return Err(BackendError::rpc(REPEATED_COMMIT_CODE, "Repeated Commit"));
        }

        let signed_len = message.len() - 96;
        let tx_id = TxId::from_bytes(sha256(&message[..signed_len]));
        self.pending_commits.insert(commit.entry_hash, commit.clone());
        Ok((commit, tx_id))
    }

    fn store_entry(&mut self, entry: Entry, entry_hash: EntryHash) {
        let chain_id = *entry.chain_id();
        let blocks = self.blocks.entry(chain_id).or_default();
        let reference = EntryBlockEntry {
            entry_hash,
            timestamp: self.block_time,
        };
        match blocks.last_mut() {
            Some(block) if block.header.height == self.height => block.entries.push(reference),
            _ => {
                let sequence = blocks.len() as u64;
                blocks.push(EntryBlock {
                    header: EntryBlockHeader {
                        chain_id,
                        height: self.height,
                        timestamp: self.block_time,
                        sequence,
                    },
                    entries: vec![reference],
                });
            }
        }
        self.revealed.insert(
            entry_hash,
            RevealedEntry {
                chain_id,
                height: self.height,
                ack_queries: 0,
            },
        );
        self.entries.insert(entry_hash, entry);
    }
}

fn invalid_params(message: impl Into<String>) -> BackendError {
    BackendError::rpc(INVALID_PARAMS_CODE, message)
}

/// In-process implementation of both [`NodeBackend`] and [`ComposeBackend`].
pub struct MemoryNode {
    clock: Arc<dyn Clock>,
    state: Mutex<NodeState>,
}

impl MemoryNode {
    /// Create an empty node. Revealed entries report `TransactionACK` until
    /// their block is sealed.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            state: Mutex::new(NodeState {
                wallet: HashMap::new(),
                pending_commits: HashMap::new(),
                entries: HashMap::new(),
                revealed: HashMap::new(),
                blocks: HashMap::new(),
                height: GENESIS_HEIGHT,
                block_time: GENESIS_TIME,
                ack_schedule: vec![AckStatus::TransactionAck],
                failures: HashMap::new(),
                calls: HashMap::new(),
            }),
        }
    }

    /// Clock used to timestamp composed commits.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Statuses reported for a revealed entry on successive `ack` queries.
    /// The last one repeats until the entry's block is sealed.
    pub fn with_ack_schedule(mut self, schedule: Vec<AckStatus>) -> Self {
        if !schedule.is_empty() {
            self.state.get_mut().ack_schedule = schedule;
        }
        self
    }

    /// Import an entry credit secret so compose calls can name its public
    /// address.
    pub fn with_wallet_key(mut self, secret: Address) -> Self {
        if let Ok(public) = secret.public_address() {
            self.state
                .get_mut()
                .wallet
                .insert(public.as_str().to_owned(), secret);
        }
        self
    }

    /// Make the next `call` fail with `error`. Queued failures are consumed
    /// in order.
    pub async fn fail_next(&self, call: NodeCall, error: BackendError) {
        self.state
            .lock()
            .await
            .failures
            .entry(call)
            .or_default()
            .push_back(error);
    }

    /// How many times `call` has been made, failed or not.
    pub async fn call_count(&self, call: NodeCall) -> usize {
        self.state.lock().await.calls.get(&call).copied().unwrap_or(0)
    }

    /// Seal the open block. Everything revealed so far becomes
    /// `DBlockConfirmed`.
    pub async fn advance_block(&self) {
        let mut state = self.state.lock().await;
        state.height += 1;
        state.block_time += BLOCK_SECONDS;
    }

    /// Height of the open block.
    pub async fn height(&self) -> u64 {
        self.state.lock().await.height
    }

    /// File a chain's first entry without paying for it.
    pub async fn publish_chain(&self, chain: &Chain) -> BackendResult<EntryHash> {
        let mut state = self.state.lock().await;
        if state.blocks.contains_key(chain.chain_id()) {
            return Err(invalid_params("chain already exists"));
        }
        let entry_hash = chain
            .first_entry()
            .hash()
            .map_err(|e| invalid_params(e.to_string()))?;
        state.store_entry(chain.first_entry().clone(), entry_hash);
        Ok(entry_hash)
    }

    /// File an entry on an existing chain without paying for it.
    pub async fn publish_entry(&self, entry: &Entry) -> BackendResult<EntryHash> {
        let mut state = self.state.lock().await;
        if !state.blocks.contains_key(entry.chain_id()) {
            return Err(BackendError::NotFound(format!("chain {}", entry.chain_id())));
        }
        let entry_hash = entry.hash().map_err(|e| invalid_params(e.to_string()))?;
        state.store_entry(entry.clone(), entry_hash);
        Ok(entry_hash)
    }
}

impl Default for MemoryNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComposeBackend for MemoryNode {
    async fn compose_chain(
        &self,
        chain: &Chain,
        ec_address: &Address,
    ) -> BackendResult<ComposedPayloads> {
        let mut state = self.state.lock().await;
        state.begin(NodeCall::ComposeChain)?;
        let payer = state.signing_key(ec_address)?;

        let commit = build_chain_commit(chain, &payer, self.clock.as_ref())
            .map_err(|e| invalid_params(e.to_string()))?;
        let reveal = chain
            .first_entry()
            .marshal()
            .map_err(|e| invalid_params(e.to_string()))?;
        Ok(ComposedPayloads::new(commit, reveal))
    }

    async fn compose_entry(
        &self,
        entry: &Entry,
        ec_address: &Address,
    ) -> BackendResult<ComposedPayloads> {
        let mut state = self.state.lock().await;
        state.begin(NodeCall::ComposeEntry)?;
        let payer = state.signing_key(ec_address)?;

        let commit = build_entry_commit(entry, &payer, self.clock.as_ref())
            .map_err(|e| invalid_params(e.to_string()))?;
        let reveal = entry.marshal().map_err(|e| invalid_params(e.to_string()))?;
        Ok(ComposedPayloads::new(commit, reveal))
    }
}

#[async_trait]
impl NodeBackend for MemoryNode {
    async fn commit_chain(&self, message: &[u8]) -> BackendResult<CommitChainResponse> {
        let mut state = self.state.lock().await;
        state.begin(NodeCall::CommitChain)?;
        let (commit, tx_id) = state.accept_commit(message, true)?;
        let chain_id_hash = commit.chain.map(|c| c.chain_id_hash).unwrap_or_default();

        tracing::debug!("memory node accepted chain commit {}", commit.entry_hash);
        Ok(CommitChainResponse {
            message: "Chain Commit Success".into(),
            tx_id,
            entry_hash: commit.entry_hash,
            chain_id_hash,
        })
    }

    async fn commit_entry(&self, message: &[u8]) -> BackendResult<CommitEntryResponse> {
        let mut state = self.state.lock().await;
        state.begin(NodeCall::CommitEntry)?;
        let (commit, tx_id) = state.accept_commit(message, false)?;

        tracing::debug!("memory node accepted entry commit {}", commit.entry_hash);
        Ok(CommitEntryResponse {
            message: "Entry Commit Success".into(),
            tx_id,
            entry_hash: commit.entry_hash,
        })
    }

    async fn reveal(&self, data: &[u8]) -> BackendResult<RevealResponse> {
        let mut state = self.state.lock().await;
        state.begin(NodeCall::Reveal)?;

        let entry = Entry::unmarshal(data).map_err(|e| invalid_params(e.to_string()))?;
        let entry_hash = entry.hash().map_err(|e| invalid_params(e.to_string()))?;
        let commit = state
            .pending_commits
            .get(&entry_hash)
            .ok_or_else(|| invalid_params("no commit found for entry"))?;

        let chain_exists = state.blocks.contains_key(entry.chain_id());
        let required = if commit.is_chain_commit() {
            if !commit.welds(entry.chain_id()) {
                return Err(invalid_params("chain commit does not match the revealed chain"));
            }
            if chain_exists {
                return Err(invalid_params("chain already exists"));
            }
            Chain::from_entry(entry.clone())
                .and_then(|chain| chain.cost())
                .map_err(|e| invalid_params(e.to_string()))?
        } else {
            if !chain_exists {
                return Err(BackendError::NotFound(format!("chain {}", entry.chain_id())));
            }
            entry.cost().map_err(|e| invalid_params(e.to_string()))?
        };
        if commit.cost < required {
            return Err(invalid_params(format!(
                "commit pays {} credits, entry needs {required}",
                commit.cost
            )));
        }

        let chain_id = *entry.chain_id();
        state.pending_commits.remove(&entry_hash);
        state.store_entry(entry, entry_hash);

        tracing::debug!("memory node revealed {} on chain {}", entry_hash, chain_id);
        Ok(RevealResponse {
            message: "Entry Reveal Success".into(),
            entry_hash,
            chain_id,
        })
    }

    async fn ack_status(
        &self,
        entry_hash: &EntryHash,
        chain_id: &ChainId,
    ) -> BackendResult<AckResponse> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.begin(NodeCall::AckStatus)?;

        let open_height = state.height;
        let schedule_len = state.ack_schedule.len();
        if let Some(revealed) = state.revealed.get_mut(entry_hash) {
            if &revealed.chain_id == chain_id {
                let status = if revealed.height < open_height {
                    AckStatus::DBlockConfirmed
                } else {
                    let step = revealed.ack_queries.min(schedule_len - 1);
                    revealed.ack_queries += 1;
                    state.ack_schedule[step]
                };
                let commit_status = status.max(AckStatus::TransactionAck);
                return Ok(AckResponse::new(*entry_hash, commit_status, status));
            }
        }

        let commit_status = if state.pending_commits.contains_key(entry_hash) {
            AckStatus::TransactionAck
        } else {
            AckStatus::Unknown
        };
        Ok(AckResponse::new(*entry_hash, commit_status, AckStatus::Unknown))
    }

    async fn entry_blocks_for_chain(&self, chain_id: &ChainId) -> BackendResult<Vec<EntryBlock>> {
        let mut state = self.state.lock().await;
        state.begin(NodeCall::EntryBlocks)?;
        let blocks = state
            .blocks
            .get(chain_id)
            .ok_or_else(|| BackendError::NotFound(format!("chain {chain_id}")))?;
        // Newest first, the order a node walks back from the chain head.
        Ok(blocks.iter().rev().cloned().collect())
    }

    async fn entry_by_hash(&self, entry_hash: &EntryHash) -> BackendResult<Entry> {
        let mut state = self.state.lock().await;
        state.begin(NodeCall::EntryByHash)?;
        state
            .entries
            .get(entry_hash)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("entry {entry_hash}")))
    }
}
