//! Domain layer for log-grouper.
//!
//! Contains the canonical types shared across all modules:
//! - `LogRecord`: the emitted entry, parent or child
//! - `HttpRequestSummary`: HTTP exchange summary carried on parent records
//! - `Severity`: totally ordered domain severity
//! - `Resource`: static per-process environment descriptor

pub mod record;
pub mod resource;
pub mod severity;

pub use record::{HttpRequestSummary, LogRecord};
pub use resource::{Resource, ResourceKind};
pub use severity::Severity;
