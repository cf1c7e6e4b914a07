//! Test fixtures and helpers.
//!
//! Deterministic keys and an in-memory network for integration tests.

use std::sync::{Arc, Mutex};

use factom_client_core::{Address, AddressType, Chain, FixedClock};
use factom_client_identity::creation_entry;
use factom_client_submit::{
    CommitResponse, Composer, ComposedPayloads, MemoryNode, ObserverSet, PollOutcome,
    RevealResponse, SubmissionObserver, SubmissionPhase, SubmitConfig, SubmitError, Submitter,
};

/// Entry credit secret with a well known public address.
pub const EC_SECRET: &str = "Es3Y6U6H1Pfg4wYag8VMtRZEGuEJnfkJ2ZuSyCVcQKweB6y4WvGH";

/// Public address of [`EC_SECRET`].
pub const EC_PUBLIC: &str = "EC3cqLZPq5ypwRB5CLfXnud5vkWAV2sd235CFf9KcWcE3FH9GRxv";

/// Commit timestamp used by fixture clocks, in milliseconds.
pub const FIXTURE_TIME_MS: u64 = 1_700_000_000_000;

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

/// The entry credit secret behind [`EC_SECRET`].
pub fn ec_payer() -> Address {
    Address::parse(EC_SECRET).expect("fixture address is valid")
}

/// Deterministic entry credit secret.
pub fn ec_key(seed: u8) -> Address {
    Address::from_payload([seed; 32], AddressType::EntryCreditSecret)
}

/// Deterministic factoid secret.
pub fn factoid_key(seed: u8) -> Address {
    Address::from_payload([seed; 32], AddressType::FactoidSecret)
}

/// Deterministic identity secret (`idsec`).
pub fn identity_key(seed: u8) -> Address {
    Address::from_payload([seed; 32], AddressType::IdentitySecret)
}

/// An in-memory node with a submitter wired to it.
pub struct TestNetwork {
    pub node: Arc<MemoryNode>,
    pub submitter: Submitter,
}

impl TestNetwork {
    /// A network whose commits are stamped with [`FIXTURE_TIME_MS`].
    pub fn new() -> Self {
        Self::with_config(SubmitConfig::default())
    }

    pub fn with_config(config: SubmitConfig) -> Self {
        Self::with_node(MemoryNode::new(), config)
    }

    pub fn with_node(node: MemoryNode, config: SubmitConfig) -> Self {
        let node = Arc::new(node.with_clock(Arc::new(FixedClock(FIXTURE_TIME_MS))));
        let submitter = Submitter::new(node.clone(), Composer::online(node.clone()), config);
        Self { node, submitter }
    }

    /// Publish an identity chain holding the public keys of `keys`, without
    /// going through commit/reveal.
    pub async fn publish_identity(&self, name: &str, keys: &[Address]) -> Chain {
        let publics = keys
            .iter()
            .filter_map(|k| k.public_address().ok())
            .collect();
        let chain = creation_entry([name.as_bytes().to_vec()], publics)
            .expect("fixture identity is valid");
        self.node
            .publish_chain(&chain)
            .await
            .expect("fixture identity is new");
        chain
    }
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// One observed submission event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    Composed,
    Committed,
    Revealed,
    Acknowledged { timed_out: bool },
    Confirmed { timed_out: bool },
    Error(SubmissionPhase),
}

/// An observer that records what it sees.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// A one-element observer set holding this observer.
    pub fn observe(self: &Arc<Self>) -> ObserverSet {
        let observer: Arc<dyn SubmissionObserver> = self.clone();
        ObserverSet::new(vec![observer])
    }

    fn record(&self, event: ObservedEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

impl SubmissionObserver for RecordingObserver {
    fn on_compose(&self, _payloads: &ComposedPayloads) {
        self.record(ObservedEvent::Composed);
    }

    fn on_commit(&self, _response: &CommitResponse) {
        self.record(ObservedEvent::Committed);
    }

    fn on_reveal(&self, _response: &RevealResponse) {
        self.record(ObservedEvent::Revealed);
    }

    fn on_acknowledged(&self, outcome: &PollOutcome) {
        self.record(ObservedEvent::Acknowledged {
            timed_out: outcome.timed_out,
        });
    }

    fn on_confirmed(&self, outcome: &PollOutcome) {
        self.record(ObservedEvent::Confirmed {
            timed_out: outcome.timed_out,
        });
    }

    fn on_error(&self, phase: SubmissionPhase, _error: &SubmitError) {
        self.record(ObservedEvent::Error(phase));
    }
}
