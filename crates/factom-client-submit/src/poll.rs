//! Status polling with a fixed interval and an overall timeout.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use factom_client_core::{ChainId, EntryHash};

use crate::backend::NodeBackend;
use crate::responses::{AckResponse, AckStatus};

/// Statuses that end acknowledgement polling.
pub const ACK_TARGETS: &[AckStatus] = &[AckStatus::TransactionAck, AckStatus::DBlockConfirmed];

/// Statuses that end confirmation polling.
pub const CONFIRM_TARGETS: &[AckStatus] = &[AckStatus::DBlockConfirmed];

/// Interval and timeout of one polling phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollConfig {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// 1 s interval, 10 s timeout.
    pub const fn acknowledge() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(10))
    }

    /// 60 s interval, 15 min timeout.
    pub const fn confirm() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(15 * 60))
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::acknowledge()
    }
}

/// How a polling phase ended.
///
/// A timeout is a normal outcome, not an error: the last status seen is
/// kept and the entry may still be processed by the network later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Last status seen, `Unknown` if every attempt failed.
    pub status: AckStatus,
    /// Last successful response.
    pub last_response: Option<AckResponse>,
    pub attempts: u32,
    pub elapsed: Duration,
    /// The timeout ran out before a target status was seen.
    pub timed_out: bool,
    /// The network may still act on the submission.
    pub possibly_pending: bool,
}

impl PollOutcome {
    pub fn reached(&self) -> bool {
        !self.timed_out
    }
}

/// Query the node until the entry reaches one of `targets` or `config`'s
/// timeout runs out.
///
/// Backend errors are logged and count as attempts. A further attempt only
/// starts if it can complete its interval within the timeout, so a timeout
/// equal to the interval allows exactly one attempt.
pub async fn poll_ack_status(
    node: &dyn NodeBackend,
    entry_hash: &EntryHash,
    chain_id: &ChainId,
    targets: &[AckStatus],
    config: PollConfig,
) -> PollOutcome {
    let start = Instant::now();
    let mut status = AckStatus::Unknown;
    let mut last_response = None;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match node.ack_status(entry_hash, chain_id).await {
            Ok(response) => {
                status = response.status();
                last_response = Some(response);
                if targets.contains(&status) {
                    tracing::debug!(
                        "entry {} reached {:?} after {} attempts",
                        entry_hash,
                        status,
                        attempts
                    );
                    return PollOutcome {
                        status,
                        last_response,
                        attempts,
                        elapsed: start.elapsed(),
                        timed_out: false,
                        possibly_pending: false,
                    };
                }
            }
            Err(e) => {
                tracing::warn!("ack query for {} failed (attempt {}): {}", entry_hash, attempts, e);
            }
        }

        if start.elapsed() + config.interval >= config.timeout {
            break;
        }
        sleep(config.interval).await;
    }

    tracing::info!(
        "polling for {} timed out after {:?} with status {:?}",
        entry_hash,
        config.timeout,
        status
    );
    PollOutcome {
        status,
        last_response,
        attempts,
        elapsed: start.elapsed(),
        timed_out: true,
        possibly_pending: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{MemoryNode, NodeCall};
    use crate::backend::{ComposeBackend, NodeBackend};
    use crate::error::BackendError;
    use factom_client_core::{Address, Chain};

    const EC_SECRET: &str = "Es3Y6U6H1Pfg4wYag8VMtRZEGuEJnfkJ2ZuSyCVcQKweB6y4WvGH";

    async fn revealed(node: &MemoryNode) -> (EntryHash, ChainId) {
        let chain = Chain::new([&b"poll"[..]], &b""[..]).unwrap();
        let payer = Address::parse(EC_SECRET).unwrap();
        let composed = node.compose_chain(&chain, &payer).await.unwrap();
        node.commit_chain(&composed.commit).await.unwrap();
        let reveal = node.reveal(&composed.reveal).await.unwrap();
        (reveal.entry_hash, reveal.chain_id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_target() {
        let node = MemoryNode::new().with_ack_schedule(vec![
            AckStatus::NotConfirmed,
            AckStatus::NotConfirmed,
            AckStatus::TransactionAck,
        ]);
        let (hash, chain) = revealed(&node).await;

        let outcome = poll_ack_status(&node, &hash, &chain, ACK_TARGETS, PollConfig::acknowledge()).await;
        assert_eq!(outcome.status, AckStatus::TransactionAck);
        assert_eq!(outcome.attempts, 3);
        assert!(outcome.reached());
        assert!(!outcome.possibly_pending);
        assert!(outcome.elapsed >= Duration::from_secs(2));
        assert!(outcome.elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_equal_to_interval_polls_once() {
        let node = MemoryNode::new().with_ack_schedule(vec![AckStatus::NotConfirmed]);
        let (hash, chain) = revealed(&node).await;

        let config = PollConfig::new(Duration::from_secs(1), Duration::from_secs(1));
        let outcome = poll_ack_status(&node, &hash, &chain, ACK_TARGETS, config).await;

        assert_eq!(outcome.attempts, 1);
        assert!(outcome.timed_out);
        assert!(outcome.possibly_pending);
        assert_eq!(outcome.status, AckStatus::NotConfirmed);
        assert!(outcome.last_response.is_some());
        assert_eq!(node.call_count(NodeCall::AckStatus).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_attempt_count() {
        let node = MemoryNode::new().with_ack_schedule(vec![AckStatus::NotConfirmed]);
        let (hash, chain) = revealed(&node).await;

        let outcome = poll_ack_status(&node, &hash, &chain, ACK_TARGETS, PollConfig::acknowledge()).await;
        assert_eq!(outcome.attempts, 10);
        assert!(outcome.timed_out);
        assert!(outcome.elapsed < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_absorbed() {
        let node = MemoryNode::new();
        let (hash, chain) = revealed(&node).await;
        for _ in 0..2 {
            node.fail_next(NodeCall::AckStatus, BackendError::Transport("timeout".into()))
                .await;
        }

        let outcome = poll_ack_status(&node, &hash, &chain, ACK_TARGETS, PollConfig::acknowledge()).await;
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.status, AckStatus::TransactionAck);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_errors_time_out_unknown() {
        let node = MemoryNode::new();
        let (hash, chain) = revealed(&node).await;
        for _ in 0..5 {
            node.fail_next(NodeCall::AckStatus, BackendError::Transport("down".into()))
                .await;
        }

        let config = PollConfig::new(Duration::from_secs(1), Duration::from_secs(3));
        let outcome = poll_ack_status(&node, &hash, &chain, ACK_TARGETS, config).await;
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.status, AckStatus::Unknown);
        assert!(outcome.last_response.is_none());
        assert!(outcome.timed_out);
    }

    proptest::proptest! {
        #[test]
        fn test_attempts_fit_the_timeout(interval in 1u64..30, timeout in 1u64..120) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();
            let outcome = runtime.block_on(async {
                let node = MemoryNode::new().with_ack_schedule(vec![AckStatus::NotConfirmed]);
                let (hash, chain) = revealed(&node).await;
                let config = PollConfig::new(Duration::from_secs(interval), Duration::from_secs(timeout));
                poll_ack_status(&node, &hash, &chain, ACK_TARGETS, config).await
            });

            let expected = timeout.div_ceil(interval).max(1);
            proptest::prop_assert_eq!(u64::from(outcome.attempts), expected);
            proptest::prop_assert!(outcome.elapsed < Duration::from_secs(timeout));
            proptest::prop_assert!(outcome.timed_out);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_targets_ignore_transaction_ack() {
        let node = MemoryNode::new();
        let (hash, chain) = revealed(&node).await;

        let config = PollConfig::new(Duration::from_secs(60), Duration::from_secs(180));
        let outcome = poll_ack_status(&node, &hash, &chain, CONFIRM_TARGETS, config).await;
        assert!(outcome.timed_out);
        assert_eq!(outcome.status, AckStatus::TransactionAck);

        node.advance_block().await;
        let outcome = poll_ack_status(&node, &hash, &chain, CONFIRM_TARGETS, config).await;
        assert_eq!(outcome.status, AckStatus::DBlockConfirmed);
        assert_eq!(outcome.attempts, 1);
    }
}
