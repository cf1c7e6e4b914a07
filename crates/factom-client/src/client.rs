//! The client: submission and identity resolution over one node.
//!
//! A [`FactomClient`] owns everything a caller would otherwise have to wire
//! up: the node backend, the composer, the worker pool and the observers
//! that watch every submission. Clones share the pool and the backend.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use factom_client_core::{validate_chain, validate_entry, Address, Chain, ChainId, Entry, KeyFamily};
use factom_client_identity::{
    reduce_identity, ChainEntry, Cutoff, Did, IdentityError, IdentitySnapshot,
};
use factom_client_submit::{
    BackendError, Composer, EntryBlock, NodeBackend, ObserverSet, SubmissionHandle,
    SubmissionObserver, SubmitConfig, Submitter,
};

use crate::error::{ClientError, Result};

/// Configuration for the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Submission timing and concurrency.
    pub submit: SubmitConfig,
    /// Network this client talks to. DIDs naming another network are refused.
    pub network: Option<String>,
}

impl ClientConfig {
    pub fn with_submit(mut self, submit: SubmitConfig) -> Self {
        self.submit = submit;
        self
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }
}

/// Handle to a Factom node.
///
/// Provides a unified API for:
/// - Creating chains and adding entries through the commit/reveal protocol
/// - Resolving identities from their chains
#[derive(Clone)]
pub struct FactomClient {
    node: Arc<dyn NodeBackend>,
    submitter: Submitter,
    observers: ObserverSet,
    config: ClientConfig,
}

impl FactomClient {
    /// Create a client for `node`, composing payloads with `composer`.
    pub fn new(node: Arc<dyn NodeBackend>, composer: Composer, config: ClientConfig) -> Self {
        let submitter = Submitter::new(Arc::clone(&node), composer, config.submit.clone());
        Self {
            node,
            submitter,
            observers: ObserverSet::default(),
            config,
        }
    }

    /// Add an observer that sees every later submission.
    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    /// Add an observer that sees every later submission. Submissions already
    /// running keep the observers they started with.
    pub fn add_observer(&mut self, observer: Arc<dyn SubmissionObserver>) {
        self.observers = self.observers.extended(vec![observer]);
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn node(&self) -> &Arc<dyn NodeBackend> {
        &self.node
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Create `chain`, paid for by `payer`.
    ///
    /// Returns once a worker slot is free and the submission has started.
    /// `observers` see this submission only, after the client's own.
    pub async fn submit_chain(
        &self,
        chain: Chain,
        payer: &Address,
        confirm: bool,
        observers: Vec<Arc<dyn SubmissionObserver>>,
    ) -> Result<SubmissionHandle> {
        validate_chain(&chain)?;
        payer.assert_family(KeyFamily::EntryCredit)?;
        tracing::debug!("submitting chain {}", chain.chain_id());

        let handle = self
            .submitter
            .submit_chain(chain, payer.clone(), confirm, self.observers.extended(observers))
            .await?;
        Ok(handle)
    }

    /// Add `entry` to an existing chain, paid for by `payer`.
    pub async fn submit_entry(
        &self,
        entry: Entry,
        payer: &Address,
        confirm: bool,
        observers: Vec<Arc<dyn SubmissionObserver>>,
    ) -> Result<SubmissionHandle> {
        validate_entry(&entry)?;
        payer.assert_family(KeyFamily::EntryCredit)?;
        tracing::debug!("submitting entry to chain {}", entry.chain_id());

        let handle = self
            .submitter
            .submit_entry(entry, payer.clone(), confirm, self.observers.extended(observers))
            .await?;
        Ok(handle)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identity
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve an identity from a DID or a bare chain id.
    ///
    /// Only entries at or below `max_height` and `max_timestamp` take part.
    pub async fn resolve_identity(
        &self,
        identifier: &str,
        max_height: Option<u64>,
        max_timestamp: Option<u64>,
    ) -> Result<IdentitySnapshot> {
        let did = Did::parse(identifier)?;
        self.resolve_did(&did, Cutoff::new(max_height, max_timestamp))
            .await
    }

    pub async fn resolve_did(&self, did: &Did, cutoff: Cutoff) -> Result<IdentitySnapshot> {
        if let (Some(expected), Some(named)) = (self.config.network.as_deref(), did.network()) {
            if expected != named {
                return Err(ClientError::IdentityResolution {
                    chain_id: *did.chain_id(),
                    reason: format!("DID names network {named}, client is on {expected}"),
                });
            }
        }

        let entries = self.chain_entries(did.chain_id()).await?;
        let snapshot = reduce_identity(did.chain_id(), &entries, cutoff).map_err(|e| match e {
            IdentityError::MalformedIdentityChain(reason) => ClientError::IdentityResolution {
                chain_id: *did.chain_id(),
                reason,
            },
            other => ClientError::Identity(other),
        })?;
        tracing::debug!(
            "resolved identity {} with {} keys, {} entries skipped",
            did,
            snapshot.keys.len(),
            snapshot.rejected.len()
        );
        Ok(snapshot)
    }

    /// Every entry of a chain, oldest first, with its block position.
    pub async fn chain_entries(&self, chain_id: &ChainId) -> Result<Vec<ChainEntry>> {
        let mut blocks = self
            .node
            .entry_blocks_for_chain(chain_id)
            .await
            .map_err(|e| match e {
                BackendError::NotFound(_) => ClientError::IdentityResolution {
                    chain_id: *chain_id,
                    reason: "chain not found".into(),
                },
                other => ClientError::Backend(other),
            })?;
        blocks.sort_by_key(|b| (b.header.height, b.header.sequence));

        let mut entries = Vec::with_capacity(blocks.iter().map(|b| b.entries.len()).sum());
        for block in &blocks {
            self.fetch_block_entries(chain_id, block, &mut entries).await?;
        }
        Ok(entries)
    }

    async fn fetch_block_entries(
        &self,
        chain_id: &ChainId,
        block: &EntryBlock,
        out: &mut Vec<ChainEntry>,
    ) -> Result<()> {
        for reference in &block.entries {
            let entry = self.node.entry_by_hash(&reference.entry_hash).await?;
            if entry.chain_id() != chain_id {
                return Err(ClientError::IdentityResolution {
                    chain_id: *chain_id,
                    reason: format!("entry {} belongs to another chain", reference.entry_hash),
                });
            }
            out.push(ChainEntry {
                entry,
                entry_hash: reference.entry_hash,
                block_height: block.height(),
                timestamp: reference.timestamp,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for FactomClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactomClient")
            .field("submitter", &self.submitter)
            .field("observers", &self.observers)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factom_client_core::FixedClock;
    use factom_client_identity::{creation_entry, key_replacement_entry, EntryRejection};
    use factom_client_submit::MemoryNode;
    use factom_client_testkit::fixtures::{identity_key, EC_SECRET};

    fn client_on(node: &Arc<MemoryNode>) -> FactomClient {
        FactomClient::new(node.clone(), Composer::online(node.clone()), ClientConfig::default())
    }

    fn memory_node() -> Arc<MemoryNode> {
        Arc::new(MemoryNode::new().with_clock(Arc::new(FixedClock(1_700_000_000_000))))
    }

    #[test]
    fn test_config_from_json() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"network": "testnet", "submit": {"max_concurrent": 2}}"#)
                .unwrap();
        assert_eq!(config.network.as_deref(), Some("testnet"));
        assert_eq!(config.submit.max_concurrent, 2);
        assert_eq!(config.submit, SubmitConfig::default().with_max_concurrent(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_rejects_bad_input_before_starting() {
        let node = memory_node();
        let client = client_on(&node);
        let payer = Address::parse(EC_SECRET).unwrap();

        let oversized = Entry::new(ChainId::ZERO, [&b"x"[..]], vec![0u8; 10_240]);
        assert!(matches!(
            client.submit_entry(oversized, &payer, false, vec![]).await,
            Err(ClientError::Validation(_))
        ));

        let chain = Chain::new([&b"x"[..]], &b""[..]).unwrap();
        let factoid = Address::generate(KeyFamily::Factoid);
        assert!(matches!(
            client.submit_chain(chain, &factoid, false, vec![]).await,
            Err(ClientError::Address(_))
        ));
        assert_eq!(client.submitter.pool().available(), 16);
    }

    #[tokio::test]
    async fn test_resolve_identity_replays_chain() {
        let node = memory_node();
        let client = client_on(&node);
        let keys: Vec<Address> = (1..=3).map(identity_key).collect();
        let publics: Vec<Address> = keys.iter().map(|k| k.public_address().unwrap()).collect();

        let chain = creation_entry([&b"alice"[..]], publics.clone()).unwrap();
        node.publish_chain(&chain).await.unwrap();
        node.advance_block().await;

        let replacement = identity_key(4).public_address().unwrap();
        let entry = key_replacement_entry(chain.chain_id(), &publics[2], &replacement, &keys[0])
            .unwrap();
        node.publish_entry(&entry).await.unwrap();
        // Signed by a weaker key: skipped.
        let bad = key_replacement_entry(chain.chain_id(), &publics[0], &replacement, &keys[1])
            .unwrap();
        node.publish_entry(&bad).await.unwrap();

        let did = Did::new(*chain.chain_id()).to_string();
        let snapshot = client.resolve_identity(&did, None, None).await.unwrap();
        assert_eq!(snapshot.keys, vec![publics[0].clone(), publics[1].clone(), replacement]);
        assert_eq!(snapshot.updated_height, 2);
        assert_eq!(snapshot.rejected.len(), 1);
        assert!(matches!(
            snapshot.rejected[0].reason,
            EntryRejection::InvalidKeyOrdering { .. } | EntryRejection::NewKeyAlreadyActive
        ));

        let before = client
            .resolve_identity(&chain.chain_id().to_hex(), Some(1), None)
            .await
            .unwrap();
        assert_eq!(before.keys, publics);
    }

    #[tokio::test]
    async fn test_resolve_unknown_chain() {
        let node = memory_node();
        let client = client_on(&node);
        let missing = ChainId::from_bytes([7; 32]);

        let err = client
            .resolve_identity(&missing.to_hex(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::IdentityResolution { chain_id, .. } if chain_id == missing));

        assert!(matches!(
            client.resolve_identity("did:factom:nothex", None, None).await,
            Err(ClientError::Identity(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_chain_that_is_not_an_identity() {
        let node = memory_node();
        let client = client_on(&node);
        let chain = Chain::new([&b"NotAnIdentity"[..]], &b"{}"[..]).unwrap();
        node.publish_chain(&chain).await.unwrap();

        let err = client
            .resolve_identity(&chain.chain_id().to_hex(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::IdentityResolution { chain_id, .. } if chain_id == *chain.chain_id()
        ));

        // A cutoff before the creation entry leaves nothing to reduce.
        let identity = creation_entry([&b"bob"[..]], vec![identity_key(1).public_address().unwrap()])
            .unwrap();
        node.publish_chain(&identity).await.unwrap();
        assert!(matches!(
            client
                .resolve_identity(&identity.chain_id().to_hex(), Some(0), None)
                .await,
            Err(ClientError::IdentityResolution { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_refuses_other_network() {
        let node = memory_node();
        let client = FactomClient::new(
            node.clone(),
            Composer::online(node.clone()),
            ClientConfig::default().with_network("mainnet"),
        );
        let did = Did::new(ChainId::from_bytes([1; 32])).with_network("testnet");

        let err = client.resolve_did(&did, Cutoff::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::IdentityResolution { .. }));
        assert_eq!(node.call_count(factom_client_submit::NodeCall::EntryBlocks).await, 0);
    }
}
