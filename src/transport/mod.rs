//! Background delivery pipeline.
//!
//! Producers enqueue records synchronously and never wait on the network;
//! one dedicated worker task drains the bounded queue and flushes batches to
//! the sink. Delivery is best-effort: a full queue drops per the configured
//! policy and a failing sink costs at most one in-cycle retry.

pub mod queue;
mod worker;

pub use queue::{BoundedQueue, DropPolicy, QueueEntry, QueueError};

use crate::domain::{HttpRequestSummary, LogRecord, Resource, Severity};
use crate::sink::LogSink;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use worker::FlushWorker;

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub queue_capacity: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub drop_policy: DropPolicy,
    pub shutdown_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
            batch_size: 1_000,
            flush_interval: Duration::from_millis(500),
            drop_policy: DropPolicy::Oldest,
            shutdown_timeout: Duration::from_secs(3),
        }
    }
}

/// Counter snapshot for internal diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportStats {
    pub enqueued: u64,
    pub dropped: u64,
    pub flushed: u64,
    pub flush_failures: u64,
}

struct Inner {
    queue: Arc<BoundedQueue>,
    notify: Arc<Notify>,
    cancel: CancellationToken,
    batch_size: usize,
    shutdown_timeout: Duration,
    flushed: Arc<AtomicU64>,
    flush_failures: Arc<AtomicU64>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable producer handle to the delivery pipeline.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<Inner>,
}

impl Transport {
    /// Builds the bounded queue and spawns the flush worker onto the current
    /// tokio runtime.
    pub fn spawn<S: LogSink>(config: TransportConfig, sink: S) -> Result<Self, QueueError> {
        if config.batch_size == 0 || config.batch_size > config.queue_capacity {
            return Err(QueueError::InvalidBatchSize {
                batch_size: config.batch_size,
                capacity: config.queue_capacity,
            });
        }

        let queue = Arc::new(BoundedQueue::new(config.queue_capacity, config.drop_policy)?);
        let notify = Arc::new(Notify::new());
        let cancel = CancellationToken::new();
        let flushed = Arc::new(AtomicU64::new(0));
        let flush_failures = Arc::new(AtomicU64::new(0));

        let worker = FlushWorker {
            queue: Arc::clone(&queue),
            sink,
            batch_size: config.batch_size,
            flush_interval: config.flush_interval,
            notify: Arc::clone(&notify),
            cancel: cancel.clone(),
            flushed: Arc::clone(&flushed),
            flush_failures: Arc::clone(&flush_failures),
        };
        let handle = tokio::spawn(worker.run());

        Ok(Self {
            inner: Arc::new(Inner {
                queue,
                notify,
                cancel,
                batch_size: config.batch_size,
                shutdown_timeout: config.shutdown_timeout,
                flushed,
                flush_failures,
                worker: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Enqueues a record for the named stream. Synchronous and non-blocking;
    /// a full queue applies the drop policy instead of waiting.
    pub fn enqueue(&self, log_name: Arc<str>, record: LogRecord) {
        self.inner.queue.push(QueueEntry { log_name, record });
        if self.inner.queue.len() >= self.inner.batch_size {
            self.inner.notify.notify_one();
        }
    }

    /// Constructs a record from its parts and enqueues it.
    #[allow(clippy::too_many_arguments)]
    pub fn send(
        &self,
        log_name: Arc<str>,
        message: Option<String>,
        timestamp: DateTime<Utc>,
        severity: Severity,
        resource: Resource,
        labels: Option<HashMap<String, String>>,
        trace: Option<String>,
        span_id: Option<String>,
        http_request: Option<HttpRequestSummary>,
    ) {
        self.enqueue(
            log_name,
            LogRecord {
                message,
                timestamp,
                severity,
                resource,
                labels,
                trace,
                span_id,
                http_request,
            },
        );
    }

    pub fn stats(&self) -> TransportStats {
        TransportStats {
            enqueued: self.inner.queue.enqueued(),
            dropped: self.inner.queue.dropped(),
            flushed: self.inner.flushed.load(Ordering::Relaxed),
            flush_failures: self.inner.flush_failures.load(Ordering::Relaxed),
        }
    }

    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    /// Stops the worker and drains pending entries, waiting at most the
    /// configured shutdown timeout. Entries still unflushed at the deadline
    /// are dropped. Idempotent; extra calls are no-ops.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let Some(mut handle) = self.inner.worker.lock().take() else {
            return;
        };

        match timeout(self.inner.shutdown_timeout, &mut handle).await {
            Ok(Ok(())) => info!("transport drained and stopped"),
            Ok(Err(e)) => warn!(error = %e, "flush worker terminated abnormally"),
            Err(_) => {
                handle.abort();
                warn!(
                    pending = self.inner.queue.len(),
                    "shutdown drain timed out, dropping remaining entries"
                );
            }
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("queue", &self.inner.queue)
            .field("batch_size", &self.inner.batch_size)
            .finish()
    }
}
