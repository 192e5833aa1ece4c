use crate::domain::LogRecord;
use clap::ValueEnum;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("invalid queue capacity: {0}")]
    InvalidCapacity(usize),
    #[error("invalid batch size {batch_size} for queue capacity {capacity}")]
    InvalidBatchSize { batch_size: usize, capacity: usize },
}

/// What happens to entries when the queue is at capacity. Enqueueing never
/// blocks the request path; one side of the queue loses instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPolicy {
    /// Evict the oldest pending entry to make room (queue keeps the newest N).
    #[default]
    Oldest,
    /// Discard the incoming entry.
    Newest,
}

/// One pending record addressed to a log stream, awaiting batch flush.
/// Never mutated after enqueue.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub log_name: Arc<str>,
    pub record: LogRecord,
}

/// Bounded FIFO shared by all producing requests and the single flush worker.
///
/// Producers only append (lock held for one push); the worker exclusively
/// drains. FIFO order is what gives the per-stream flush-order guarantee.
pub struct BoundedQueue {
    entries: Mutex<VecDeque<QueueEntry>>,
    capacity: usize,
    policy: DropPolicy,
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

impl BoundedQueue {
    pub fn new(capacity: usize, policy: DropPolicy) -> Result<Self, QueueError> {
        if capacity == 0 || capacity > 100_000_000 {
            return Err(QueueError::InvalidCapacity(capacity));
        }
        Ok(Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(4096))),
            capacity,
            policy,
            enqueued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        })
    }

    /// Appends an entry, applying the drop policy when full. Returns `false`
    /// only when the incoming entry itself was discarded. Never blocks beyond
    /// the uncontended push lock.
    pub fn push(&self, entry: QueueEntry) -> bool {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            match self.policy {
                DropPolicy::Oldest => {
                    entries.pop_front();
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
                DropPolicy::Newest => {
                    drop(entries);
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
            }
        }
        entries.push_back(entry);
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Removes and returns up to `max` entries in enqueue order.
    pub fn drain(&self, max: usize) -> Vec<QueueEntry> {
        let mut entries = self.entries.lock();
        let take = max.min(entries.len());
        entries.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for BoundedQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("policy", &self.policy)
            .field("enqueued", &self.enqueued.load(Ordering::Relaxed))
            .field("dropped", &self.dropped.load(Ordering::Relaxed))
            .finish()
    }
}
