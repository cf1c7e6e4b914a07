//! The submission protocol.
//!
//! ```text
//! compose -> commit -> wait -> reveal -> acknowledge -> (confirm)
//! ```
//!
//! Each submission runs these phases in order on a pooled task. Compose,
//! commit and reveal failures end the submission, except a repeated commit,
//! which means the fee was already paid and only produces a warning. The two
//! polling phases never fail: they report a [`PollOutcome`] instead.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use factom_client_core::{Address, Chain, ChainId, Entry, EntryHash};

use crate::backend::NodeBackend;
use crate::compose::Composer;
use crate::config::SubmitConfig;
use crate::error::{BackendError, Result, SubmitError};
use crate::observer::{ObserverSet, SubmissionObserver};
use crate::poll::{poll_ack_status, PollOutcome, ACK_TARGETS, CONFIRM_TARGETS};
use crate::pool::WorkerPool;
use crate::responses::{CommitResponse, ComposedPayloads, RevealResponse};
use crate::state::{SubmissionKind, SubmissionPhase, SubmissionState};

/// A chain or entry to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Chain(Chain),
    Entry(Entry),
}

impl Submission {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            Self::Chain(_) => SubmissionKind::Chain,
            Self::Entry(_) => SubmissionKind::Entry,
        }
    }

    pub fn chain_id(&self) -> &ChainId {
        match self {
            Self::Chain(chain) => chain.chain_id(),
            Self::Entry(entry) => entry.chain_id(),
        }
    }
}

/// Everything a finished submission learned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub kind: SubmissionKind,
    pub chain_id: ChainId,
    pub entry_hash: EntryHash,
    pub composed: ComposedPayloads,
    /// `None` when the node reported a repeated commit.
    pub commit: Option<CommitResponse>,
    /// Set when the commit was rejected as repeated.
    pub commit_warning: Option<BackendError>,
    pub reveal: RevealResponse,
    pub acknowledgement: PollOutcome,
    /// Present when confirmation was requested.
    pub confirmation: Option<PollOutcome>,
}

impl SubmissionResult {
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledgement.reached()
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmation.as_ref().is_some_and(PollOutcome::reached)
    }
}

/// A running submission.
///
/// Await it for the result. Cancelling stops the submission before its next
/// phase; a phase already under way runs to completion.
#[derive(Debug)]
pub struct SubmissionHandle {
    cancel: watch::Sender<bool>,
    state: watch::Receiver<SubmissionState>,
    task: JoinHandle<Result<SubmissionResult>>,
}

impl SubmissionHandle {
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    /// A receiver that sees every state change.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.clone()
    }
}

impl Future for SubmissionHandle {
    type Output = Result<SubmissionResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => Poll::Ready(Err(SubmitError::TaskFailed(e.to_string()))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Drives submissions against a node.
#[derive(Clone)]
pub struct Submitter {
    node: Arc<dyn NodeBackend>,
    composer: Composer,
    config: SubmitConfig,
    pool: WorkerPool,
}

impl Submitter {
    pub fn new(node: Arc<dyn NodeBackend>, composer: Composer, config: SubmitConfig) -> Self {
        let pool = WorkerPool::new(config.max_concurrent);
        Self {
            node,
            composer,
            config,
            pool,
        }
    }

    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub async fn submit_chain(
        &self,
        chain: Chain,
        payer: Address,
        confirm: bool,
        observers: ObserverSet,
    ) -> Result<SubmissionHandle> {
        self.submit(Submission::Chain(chain), payer, confirm, observers)
            .await
    }

    pub async fn submit_entry(
        &self,
        entry: Entry,
        payer: Address,
        confirm: bool,
        observers: ObserverSet,
    ) -> Result<SubmissionHandle> {
        self.submit(Submission::Entry(entry), payer, confirm, observers)
            .await
    }

    /// Start a submission once a worker slot is free.
    pub async fn submit(
        &self,
        submission: Submission,
        payer: Address,
        confirm: bool,
        observers: ObserverSet,
    ) -> Result<SubmissionHandle> {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SubmissionState::Pending);

        let run = SubmissionRun {
            node: Arc::clone(&self.node),
            composer: self.composer.clone(),
            config: self.config.clone(),
            observers,
            cancel: cancel_rx,
            state: state_tx,
        };
        let task = self
            .pool
            .spawn(run.execute(submission, payer, confirm))
            .await?;

        Ok(SubmissionHandle {
            cancel: cancel_tx,
            state: state_rx,
            task,
        })
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("composer", &self.composer)
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish()
    }
}

/// State owned by one in-flight submission.
struct SubmissionRun {
    node: Arc<dyn NodeBackend>,
    composer: Composer,
    config: SubmitConfig,
    observers: ObserverSet,
    cancel: watch::Receiver<bool>,
    state: watch::Sender<SubmissionState>,
}

impl SubmissionRun {
    async fn execute(
        self,
        submission: Submission,
        payer: Address,
        confirm: bool,
    ) -> Result<SubmissionResult> {
        let kind = submission.kind();
        match self.phases(submission, payer, confirm).await {
            Ok(result) => {
                tracing::info!("{} {} submitted", kind, result.entry_hash);
                self.advance(SubmissionState::Succeeded);
                Ok(result)
            }
            Err((phase, error)) => {
                tracing::warn!("{} submission failed during {}: {}", kind, phase, error);
                self.observers.notify(phase, |o| o.on_error(phase, &error));
                self.advance(SubmissionState::Failed(error.to_string()));
                Err(error)
            }
        }
    }

    async fn phases(
        &self,
        submission: Submission,
        payer: Address,
        confirm: bool,
    ) -> std::result::Result<SubmissionResult, (SubmissionPhase, SubmitError)> {
        use SubmissionPhase::*;

        self.start(Compose)?;
        let composed = match &submission {
            Submission::Chain(chain) => self.composer.compose_chain(chain, &payer).await,
            Submission::Entry(entry) => self.composer.compose_entry(entry, &payer).await,
        }
        .map_err(|e| (Compose, e))?;
        self.advance(SubmissionState::Composed);
        self.observers.notify(Compose, |o| o.on_compose(&composed));

        self.start(Commit)?;
        let (commit, commit_warning) = match self.commit(&submission, &composed.commit).await {
            Ok(response) => (Some(response), None),
            Err(e) if e.is_repeated_commit() => {
                tracing::warn!("node reports a repeated commit, revealing anyway: {}", e);
                let advisory = SubmitError::Commit(e.clone());
                self.observers.notify(Commit, |o| o.on_error(Commit, &advisory));
                (None, Some(e))
            }
            Err(e) => return Err((Commit, SubmitError::Commit(e))),
        };
        self.advance(SubmissionState::Committed);
        if let Some(response) = &commit {
            self.observers.notify(Commit, |o| o.on_commit(response));
        }

        self.start(Wait)?;
        self.advance(SubmissionState::Waiting);
        tokio::time::sleep(self.config.reveal_wait).await;

        self.start(Reveal)?;
        let reveal = self
            .node
            .reveal(&composed.reveal)
            .await
            .map_err(|e| (Reveal, SubmitError::Reveal(e)))?;
        self.advance(SubmissionState::Revealed);
        self.observers.notify(Reveal, |o| o.on_reveal(&reveal));

        self.start(Acknowledge)?;
        let acknowledgement = poll_ack_status(
            self.node.as_ref(),
            &reveal.entry_hash,
            &reveal.chain_id,
            ACK_TARGETS,
            self.config.ack_poll(),
        )
        .await;
        if acknowledgement.reached() {
            self.advance(SubmissionState::Acknowledged);
        }
        self.observers
            .notify(Acknowledge, |o| o.on_acknowledged(&acknowledgement));

        let confirmation = if confirm {
            self.start(Confirm)?;
            let outcome = poll_ack_status(
                self.node.as_ref(),
                &reveal.entry_hash,
                &reveal.chain_id,
                CONFIRM_TARGETS,
                self.config.confirm_poll(),
            )
            .await;
            if outcome.reached() {
                self.advance(SubmissionState::Confirmed);
            }
            self.observers.notify(Confirm, |o| o.on_confirmed(&outcome));
            Some(outcome)
        } else {
            None
        };

        Ok(SubmissionResult {
            kind: submission.kind(),
            chain_id: reveal.chain_id,
            entry_hash: reveal.entry_hash,
            composed,
            commit,
            commit_warning,
            reveal,
            acknowledgement,
            confirmation,
        })
    }

    async fn commit(
        &self,
        submission: &Submission,
        message: &[u8],
    ) -> std::result::Result<CommitResponse, BackendError> {
        match submission {
            Submission::Chain(_) => self.node.commit_chain(message).await.map(CommitResponse::Chain),
            Submission::Entry(_) => self.node.commit_entry(message).await.map(CommitResponse::Entry),
        }
    }

    fn start(&self, phase: SubmissionPhase) -> std::result::Result<(), (SubmissionPhase, SubmitError)> {
        if *self.cancel.borrow() {
            return Err((phase, SubmitError::Cancelled(phase)));
        }
        tracing::debug!("starting {} phase", phase);
        Ok(())
    }

    fn advance(&self, state: SubmissionState) {
        self.state.send_replace(state);
    }
}
