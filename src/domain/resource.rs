use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Runtime environment kind emitting the logs.
///
/// Selected once at startup from the environment; a set `K_SERVICE` variable
/// indicates a managed container revision, anything else is treated as a
/// managed app instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "managed-container-revision")]
    ManagedContainerRevision,
    #[serde(rename = "managed-app-instance")]
    ManagedAppInstance,
}

/// Static per-process descriptor attached to every emitted record.
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub labels: HashMap<String, String>,
}

impl Resource {
    pub fn new(kind: ResourceKind, labels: HashMap<String, String>) -> Self {
        Self { kind, labels }
    }

    /// Probes the process environment once and builds the descriptor.
    pub fn detect(labels: HashMap<String, String>) -> Self {
        let kind = if std::env::var_os("K_SERVICE").is_some() {
            ResourceKind::ManagedContainerRevision
        } else {
            ResourceKind::ManagedAppInstance
        };
        Self { kind, labels }
    }
}
