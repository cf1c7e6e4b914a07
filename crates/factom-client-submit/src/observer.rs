//! Submission observers.
//!
//! Observers see the result of every phase. They cannot change or stop the
//! submission: their methods return nothing, and a panicking observer is
//! logged and skipped.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::SubmitError;
use crate::poll::PollOutcome;
use crate::responses::{CommitResponse, ComposedPayloads, RevealResponse};
use crate::state::SubmissionPhase;

/// Receives phase results of a submission. Every method defaults to a no-op.
pub trait SubmissionObserver: Send + Sync {
    fn on_compose(&self, _payloads: &ComposedPayloads) {}

    fn on_commit(&self, _response: &CommitResponse) {}

    fn on_reveal(&self, _response: &RevealResponse) {}

    /// Called once acknowledgement polling ends, whether or not it timed out.
    fn on_acknowledged(&self, _outcome: &PollOutcome) {}

    /// Called once confirmation polling ends, whether or not it timed out.
    fn on_confirmed(&self, _outcome: &PollOutcome) {}

    /// Called for fatal errors and for advisory ones, such as a repeated
    /// commit, after which the submission carries on.
    fn on_error(&self, _phase: SubmissionPhase, _error: &SubmitError) {}
}

/// The observers of one submission, fixed when it starts.
#[derive(Clone)]
pub struct ObserverSet {
    observers: Arc<[Arc<dyn SubmissionObserver>]>,
}

impl ObserverSet {
    pub fn new(observers: Vec<Arc<dyn SubmissionObserver>>) -> Self {
        Self {
            observers: observers.into(),
        }
    }

    /// A new set with `extra` appended after this set's observers.
    pub fn extended(&self, extra: Vec<Arc<dyn SubmissionObserver>>) -> Self {
        if extra.is_empty() {
            return self.clone();
        }
        let mut all = self.observers.to_vec();
        all.extend(extra);
        Self::new(all)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn notify(&self, phase: SubmissionPhase, f: impl Fn(&dyn SubmissionObserver)) {
        for observer in self.observers.iter() {
            if catch_unwind(AssertUnwindSafe(|| f(&**observer))).is_err() {
                tracing::warn!("observer panicked during {} notification", phase);
            }
        }
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("len", &self.observers.len())
            .finish()
    }
}

impl Default for ObserverSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<Arc<dyn SubmissionObserver>>> for ObserverSet {
    fn from(observers: Vec<Arc<dyn SubmissionObserver>>) -> Self {
        Self::new(observers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factom_client_core::{ChainId, EntryHash};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl SubmissionObserver for Counter {
        fn on_reveal(&self, _response: &RevealResponse) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Panicker;

    impl SubmissionObserver for Panicker {
        fn on_reveal(&self, _response: &RevealResponse) {
            panic!("observer failure");
        }
    }

    fn reveal() -> RevealResponse {
        RevealResponse {
            message: "ok".into(),
            entry_hash: EntryHash::ZERO,
            chain_id: ChainId::ZERO,
        }
    }

    #[test]
    fn test_panicking_observer_does_not_stop_others() {
        let counter = Arc::new(Counter::default());
        let observers: Vec<Arc<dyn SubmissionObserver>> = vec![Arc::new(Panicker), counter.clone()];
        let set = ObserverSet::new(observers);

        set.notify(SubmissionPhase::Reveal, |o| o.on_reveal(&reveal()));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_extended_is_a_new_snapshot() {
        let counter = Arc::new(Counter::default());
        let first: Arc<dyn SubmissionObserver> = counter.clone();
        let base = ObserverSet::new(vec![first.clone()]);
        let extended = base.extended(vec![first]);

        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        extended.notify(SubmissionPhase::Reveal, |o| o.on_reveal(&reveal()));
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }
}
