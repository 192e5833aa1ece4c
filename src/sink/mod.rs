//! Backend sink boundary.
//!
//! The remote logging backend is an opaque collaborator behind [`LogSink`]:
//! it accepts a batch of records per named stream and owes no acknowledgment.
//! Failures stay inside the flush worker.

pub mod http;

pub use http::{HttpSink, HttpSinkConfig};

use crate::domain::LogRecord;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("invalid sink configuration: {0}")]
    InvalidConfig(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}")]
    Http { status: u16 },
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for flushed batches, one write per named stream batch.
pub trait LogSink: Send + Sync + 'static {
    fn write(
        &self,
        log_name: &str,
        records: &[LogRecord],
    ) -> impl std::future::Future<Output = Result<(), SinkError>> + Send;
}

/// In-memory sink used by tests and local development: records every write
/// and can be told to fail the next N writes.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    writes: Arc<Mutex<Vec<(String, Vec<LogRecord>)>>>,
    fail_next: Arc<AtomicU32>,
    attempts: Arc<AtomicU32>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all successful writes, in arrival order.
    pub fn writes(&self) -> Vec<(String, Vec<LogRecord>)> {
        self.writes.lock().clone()
    }

    /// All records written to `log_name` so far, flattened across batches.
    pub fn records_for(&self, log_name: &str) -> Vec<LogRecord> {
        self.writes
            .lock()
            .iter()
            .filter(|(name, _)| name == log_name)
            .flat_map(|(_, records)| records.iter().cloned())
            .collect()
    }

    /// Makes the next `n` write attempts fail with [`SinkError::Unavailable`].
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Total write attempts, including failed ones.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl LogSink for RecordingSink {
    async fn write(&self, log_name: &str, records: &[LogRecord]) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(SinkError::Unavailable("injected failure".to_string()));
        }
        self.writes
            .lock()
            .push((log_name.to_string(), records.to_vec()));
        Ok(())
    }
}
