//! Bounded worker pool.
//!
//! Each submission runs on its own task, but only while it holds a permit.
//! A caller submitting into a full pool waits for a permit instead of
//! queueing work behind it.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::{Result, SubmitError};

#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    /// A pool running at most `capacity` tasks (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free slot, then run `task` on it.
    pub async fn spawn<F>(&self, task: F) -> Result<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| SubmitError::PoolClosed)?;
        Ok(tokio::spawn(async move {
            let _permit = permit;
            task.await
        }))
    }

    /// Refuse further work. Running tasks finish normally.
    pub fn close(&self) {
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_spawn_runs_task() {
        let pool = WorkerPool::new(2);
        let handle = pool.spawn(async { 7 }).await.unwrap();
        assert_eq!(handle.await.unwrap(), 7);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_pool_blocks_submitter() {
        let pool = WorkerPool::new(1);
        let (release, wait) = oneshot::channel::<()>();
        let first = pool
            .spawn(async move {
                let _ = wait.await;
            })
            .await
            .unwrap();
        assert_eq!(pool.available(), 0);

        let blocked = tokio::time::timeout(Duration::from_secs(5), pool.spawn(async {})).await;
        assert!(blocked.is_err(), "second submission should wait for a slot");

        release.send(()).unwrap();
        first.await.unwrap();
        let second = pool.spawn(async {}).await.unwrap();
        second.await.unwrap();
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_one() {
        assert_eq!(WorkerPool::new(0).capacity(), 1);
    }

    #[tokio::test]
    async fn test_closed_pool_refuses_work() {
        let pool = WorkerPool::new(1);
        pool.close();
        assert!(matches!(pool.spawn(async {}).await, Err(SubmitError::PoolClosed)));
    }
}
