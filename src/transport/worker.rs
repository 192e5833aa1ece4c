use super::queue::{BoundedQueue, QueueEntry};
use crate::domain::LogRecord;
use crate::sink::LogSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// The single consumer of the transport queue.
///
/// Wakes on the size-threshold signal or the flush interval, whichever comes
/// first, drains pending entries in enqueue order and writes one batch per
/// log stream. Sink failures are retried once within the cycle and then the
/// batch is discarded; nothing propagates out of this task.
pub(super) struct FlushWorker<S: LogSink> {
    pub queue: Arc<BoundedQueue>,
    pub sink: S,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub notify: Arc<Notify>,
    pub cancel: CancellationToken,
    pub flushed: Arc<AtomicU64>,
    pub flush_failures: Arc<AtomicU64>,
}

impl<S: LogSink> FlushWorker<S> {
    pub async fn run(self) {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = self.notify.notified() => {}
                () = sleep(self.flush_interval) => {}
            }
            self.flush_pending().await;
        }

        // Shutdown drain; the transport handle bounds how long we get.
        self.flush_pending().await;
        debug!("flush worker stopped");
    }

    async fn flush_pending(&self) {
        while !self.queue.is_empty() {
            let entries = self.queue.drain(self.batch_size);
            if entries.is_empty() {
                break;
            }
            for (log_name, records) in group_by_stream(entries) {
                self.write_with_retry(&log_name, &records).await;
            }
        }
    }

    async fn write_with_retry(&self, log_name: &str, records: &[LogRecord]) {
        let flush_id = Uuid::new_v4();
        match self.sink.write(log_name, records).await {
            Ok(()) => {
                self.flushed.fetch_add(records.len() as u64, Ordering::Relaxed);
                debug!(%flush_id, log_name, entries = records.len(), "flushed batch");
                return;
            }
            Err(e) => {
                warn!(%flush_id, log_name, error = %e, "batch flush failed, retrying once");
            }
        }

        match self.sink.write(log_name, records).await {
            Ok(()) => {
                self.flushed.fetch_add(records.len() as u64, Ordering::Relaxed);
                debug!(%flush_id, log_name, entries = records.len(), "flushed batch on retry");
            }
            Err(e) => {
                self.flush_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    %flush_id,
                    log_name,
                    entries = records.len(),
                    error = %e,
                    "discarding batch after retry"
                );
            }
        }
    }
}

/// Splits drained entries into per-stream batches, preserving enqueue order
/// within each stream. Streams themselves carry no mutual ordering guarantee.
fn group_by_stream(entries: Vec<QueueEntry>) -> Vec<(Arc<str>, Vec<LogRecord>)> {
    let mut groups: Vec<(Arc<str>, Vec<LogRecord>)> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(name, _)| *name == entry.log_name) {
            Some((_, records)) => records.push(entry.record),
            None => groups.push((entry.log_name, vec![entry.record])),
        }
    }
    groups
}
