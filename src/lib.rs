#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_lossless,            // Infallible casts are clear enough with `as`
    clippy::cast_possible_truncation, // Safe within realistic value bounds (durations, sizes)
    clippy::cast_precision_loss,      // Acceptable for latency display
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. QueueError in queue module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

//! Groups the log records of one inbound HTTP request into a single parent
//! entry plus per-call child entries, and ships both asynchronously to a
//! remote logging backend.
//!
//! Delivery is strictly best-effort: nothing in this crate blocks, fails or
//! cancels request handling.

pub mod config;
pub mod correlator;
pub mod domain;
pub mod sink;
pub mod trace;
pub mod transport;

// Re-export main types for easy access
pub use config::{Config, ConfigError};
pub use correlator::{Correlator, RequestHead, RequestLogger, ResponseInfo};
pub use domain::{HttpRequestSummary, LogRecord, Resource, ResourceKind, Severity};
pub use sink::{HttpSink, HttpSinkConfig, LogSink, RecordingSink, SinkError};
pub use transport::{DropPolicy, Transport, TransportConfig, TransportStats};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
