//! Request log correlation.
//!
//! One [`Correlator`] exists per process; each inbound request gets its own
//! [`RequestLogger`] from [`Correlator::begin_request`] and gives it back by
//! calling [`RequestLogger::finish`]. Every log call in between is forwarded
//! to the child stream; `finish` emits exactly one parent record summarizing
//! the request with the escalated severity. Loggers of concurrent requests
//! are independent values and share nothing but the transport queue.

pub mod tally;

pub use tally::SeverityTally;

use crate::config::Config;
use crate::domain::{HttpRequestSummary, LogRecord, Resource, Severity};
use crate::trace::{self, TraceContext};
use crate::transport::Transport;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// The request-start snapshot a host framework adapter supplies.
#[derive(Debug, Clone, Default)]
pub struct RequestHead {
    pub method: String,
    pub url: String,
    pub remote_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub request_size: Option<u64>,
    /// Raw value of the configured trace header, if the request carried one.
    pub trace_header: Option<String>,
}

/// The request-end snapshot a host framework adapter supplies.
#[derive(Debug, Clone, Copy)]
pub struct ResponseInfo {
    pub status: u16,
    pub response_size: Option<u64>,
}

#[derive(Debug)]
struct Shared {
    project: String,
    resource: Resource,
    labels: Option<HashMap<String, String>>,
    min_severity: Severity,
    native_context: bool,
    trace_header_name: String,
    parent_log: Arc<str>,
    child_log: Arc<str>,
}

/// Per-process correlation component. Cheap to clone; holds only immutable
/// configuration-derived state plus the transport handle.
#[derive(Debug, Clone)]
pub struct Correlator {
    shared: Arc<Shared>,
    transport: Transport,
}

impl Correlator {
    pub fn new(config: &Config, transport: Transport) -> Self {
        let resource = Resource::detect(config.resource_labels());
        Self {
            shared: Arc::new(Shared {
                project: config.project.clone(),
                resource,
                labels: config.static_labels(),
                min_severity: config.min_severity,
                native_context: config.native_context,
                trace_header_name: config.trace_header.clone(),
                parent_log: config.parent_log_name().into(),
                child_log: config.child_log_name().into(),
            }),
            transport,
        }
    }

    /// Name of the header the host adapter should snapshot into
    /// [`RequestHead::trace_header`].
    pub fn trace_header_name(&self) -> &str {
        &self.shared.trace_header_name
    }

    /// Starts correlation for one inbound request.
    ///
    /// The returned logger exclusively owns the request's severity tally and
    /// trace snapshot; dropping it without `finish` emits no parent record.
    pub fn begin_request(&self, head: RequestHead) -> RequestLogger {
        let trace = trace::extract(head.trace_header.as_deref(), &self.shared.project);
        RequestLogger {
            shared: Arc::clone(&self.shared),
            transport: self.transport.clone(),
            tally: SeverityTally::new(self.shared.min_severity),
            trace,
            head,
            start: Instant::now(),
        }
    }
}

/// Handle for one in-flight request's logging.
#[derive(Debug)]
pub struct RequestLogger {
    shared: Arc<Shared>,
    transport: Transport,
    tally: SeverityTally,
    trace: TraceContext,
    head: RequestHead,
    start: Instant,
}

impl RequestLogger {
    /// Forwards one application log call as a child record and folds its
    /// severity into the request tally. Calls below the configured minimum
    /// are dropped entirely.
    pub fn log(&mut self, severity: Severity, message: impl Into<String>) {
        if severity < self.shared.min_severity {
            return;
        }
        let record = LogRecord {
            message: Some(message.into()),
            timestamp: Utc::now(),
            severity,
            resource: self.shared.resource.clone(),
            labels: self.shared.labels.clone(),
            trace: self.trace.trace.clone(),
            span_id: self.trace.span_id.clone(),
            http_request: None,
        };
        self.transport
            .enqueue(Arc::clone(&self.shared.child_log), record);
        self.tally.observe(severity);
    }

    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }

    /// Completes the request: escalates the response status, resolves the
    /// final severity and emits the single parent record, unless the
    /// process is configured to rely on the backend's native request-context
    /// injection. Returns the resolved severity.
    ///
    /// Consuming `self` is what guarantees exactly one parent per request.
    pub fn finish(mut self, response: ResponseInfo) -> Severity {
        let latency = self.start.elapsed();
        self.tally.escalate(response.status);
        let severity = self.tally.resolve();

        if !self.shared.native_context {
            let summary = HttpRequestSummary {
                request_method: self.head.method.clone(),
                request_url: self.head.url.clone(),
                status: response.status,
                response_size: response.response_size,
                request_size: self.head.request_size,
                latency,
                remote_ip: self.head.remote_ip.clone(),
                user_agent: self.head.user_agent.clone(),
                referer: self.head.referer.clone(),
            };
            let record = LogRecord {
                message: None,
                timestamp: Utc::now(),
                severity,
                resource: self.shared.resource.clone(),
                labels: self.shared.labels.clone(),
                trace: self.trace.trace.clone(),
                span_id: self.trace.span_id.clone(),
                http_request: Some(summary),
            };
            self.transport
                .enqueue(Arc::clone(&self.shared.parent_log), record);
        }

        severity
    }
}
