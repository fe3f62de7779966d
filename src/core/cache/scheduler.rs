//! Delayed invalidation scheduler
//!
//! One pending task per cache key. Scheduling a key that already has a
//! pending task aborts the older task, so a burst of mutations leaves at
//! most one timer per key.

use crate::core::traits::CacheBackend;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug)]
struct Pending {
    generation: u64,
    task: JoinHandle<()>,
}

type PendingMap = Arc<DashMap<String, Pending>>;

/// Runs delayed cache deletes on the tokio runtime
pub struct InvalidationScheduler {
    backend: Arc<dyn CacheBackend>,
    pending: PendingMap,
    generation: AtomicU64,
}

impl InvalidationScheduler {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            pending: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Delete `key` after `delay`, replacing any pending delete of the same key
    pub fn schedule(&self, key: String, delay: Duration) -> InvalidationHandle {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let backend = self.backend.clone();
        let pending = self.pending.clone();
        let task_key = key.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match backend.delete(&task_key).await {
                Ok(()) => debug!("Delayed invalidation of {} done", task_key),
                Err(e) => error!("Delayed invalidation of {} failed: {}", task_key, e),
            }
            pending.remove_if(&task_key, |_, p| p.generation == generation);
        });

        if let Some(older) = self.pending.insert(key.clone(), Pending { generation, task }) {
            older.task.abort();
            debug!("Superseded pending invalidation of {}", key);
        }
        // a zero delay can finish before it is registered
        self.pending
            .remove_if(&key, |_, p| p.generation == generation && p.task.is_finished());

        InvalidationHandle {
            key,
            generation,
            pending: self.pending.clone(),
        }
    }

    /// Number of scheduled deletes that have not run
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for InvalidationScheduler {
    fn drop(&mut self) {
        for entry in self.pending.iter() {
            entry.task.abort();
        }
    }
}

/// Handle to one scheduled delete
#[derive(Debug)]
pub struct InvalidationHandle {
    key: String,
    generation: u64,
    pending: PendingMap,
}

impl InvalidationHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this schedule is still waiting to run
    pub fn is_pending(&self) -> bool {
        self.pending
            .get(&self.key)
            .is_some_and(|p| p.generation == self.generation)
    }

    /// Abort the delete if it has not run and has not been superseded
    pub fn cancel(self) -> bool {
        match self
            .pending
            .remove_if(&self.key, |_, p| p.generation == self.generation)
        {
            Some((_, p)) => {
                p.task.abort();
                true
            }
            None => false,
        }
    }
}
