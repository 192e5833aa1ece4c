//! Process-wide configuration, sourced from the environment once at startup
//! and immutable thereafter.

use crate::domain::Severity;
use crate::sink::HttpSinkConfig;
use crate::transport::{DropPolicy, TransportConfig};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("environment error: {0}")]
    EnvError(String),
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "log-grouper", about, long_about = None)]
pub struct Config {
    /// Project identifier used when rewriting trace ids
    #[arg(long, env = "LOG_GROUPER_PROJECT", default_value = "")]
    pub project: String,

    /// Prefix for the derived stream names `{prefix}_request_log` and
    /// `{prefix}_application`
    #[arg(long, env = "LOG_GROUPER_LOG_PREFIX")]
    pub log_prefix: Option<String>,

    /// Name of the inbound distributed-trace header
    #[arg(
        long,
        env = "LOG_GROUPER_TRACE_HEADER",
        default_value = "X-Cloud-Trace-Context"
    )]
    pub trace_header: String,

    /// Minimum severity: records below this are neither emitted nor aggregated
    #[arg(long, env = "LOG_GROUPER_MIN_SEVERITY", default_value = "info")]
    pub min_severity: Severity,

    /// Rely on the backend's native request-context injection instead of
    /// emitting parent entries from this process
    #[arg(long, env = "LOG_GROUPER_NATIVE_CONTEXT")]
    pub native_context: bool,

    /// Static labels attached to every record, as `key=value,key=value`
    #[arg(long, env = "LOG_GROUPER_LABELS")]
    pub labels: Option<String>,

    /// Labels for the resource descriptor, as `key=value,key=value`
    #[arg(long, env = "LOG_GROUPER_RESOURCE_LABELS")]
    pub resource_labels: Option<String>,

    /// Backend sink endpoint URL
    #[arg(
        long,
        env = "LOG_GROUPER_ENDPOINT",
        default_value = "http://localhost:9600/v1/logs"
    )]
    pub endpoint: String,

    /// Capacity of the delivery queue
    #[arg(long, env = "LOG_GROUPER_QUEUE_CAPACITY", default_value = "10000")]
    pub queue_capacity: usize,

    /// Number of entries per flush batch
    #[arg(long, env = "LOG_GROUPER_BATCH_SIZE", default_value = "1000")]
    pub batch_size: usize,

    /// Flush interval in milliseconds
    #[arg(long, env = "LOG_GROUPER_FLUSH_INTERVAL_MS", default_value = "500")]
    pub flush_interval_ms: u64,

    /// Policy applied when the queue is full
    #[arg(long, env = "LOG_GROUPER_DROP_POLICY", default_value = "oldest")]
    pub drop_policy: DropPolicy,

    /// Bound on the shutdown drain, in milliseconds
    #[arg(long, env = "LOG_GROUPER_SHUTDOWN_TIMEOUT_MS", default_value = "3000")]
    pub shutdown_timeout_ms: u64,

    /// Sink request timeout in seconds
    #[arg(long, env = "LOG_GROUPER_REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Derived fields (not environment-sourced)
    #[serde(skip)]
    #[arg(skip)]
    pub flush_interval: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub shutdown_timeout: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: String::new(),
            log_prefix: None,
            trace_header: "X-Cloud-Trace-Context".to_string(),
            min_severity: Severity::Info,
            native_context: false,
            labels: None,
            resource_labels: None,
            endpoint: "http://localhost:9600/v1/logs".to_string(),
            queue_capacity: 10_000,
            batch_size: 1_000,
            flush_interval_ms: 500,
            drop_policy: DropPolicy::Oldest,
            shutdown_timeout_ms: 3_000,
            request_timeout_secs: 30,
            flush_interval: Duration::from_millis(500),
            shutdown_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::parse_from(["log-grouper"]);
        config.post_process();
        config.validate()?;
        Ok(config)
    }

    pub fn post_process(&mut self) {
        self.flush_interval = Duration::from_millis(self.flush_interval_ms);
        self.shutdown_timeout = Duration::from_millis(self.shutdown_timeout_ms);
        self.request_timeout = Duration::from_secs(self.request_timeout_secs);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "queue capacity must be greater than zero".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "batch size must be greater than zero".to_string(),
            ));
        }
        if self.batch_size > self.queue_capacity {
            return Err(ConfigError::InvalidConfig(format!(
                "batch size {} exceeds queue capacity {}",
                self.batch_size, self.queue_capacity
            )));
        }
        if self.trace_header.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "trace header name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn parent_log_name(&self) -> String {
        match &self.log_prefix {
            Some(prefix) => format!("{prefix}_request_log"),
            None => "request_log".to_string(),
        }
    }

    pub fn child_log_name(&self) -> String {
        match &self.log_prefix {
            Some(prefix) => format!("{prefix}_application"),
            None => "application".to_string(),
        }
    }

    /// Static labels attached to every record, `None` when unconfigured.
    pub fn static_labels(&self) -> Option<HashMap<String, String>> {
        self.labels.as_deref().map(parse_label_list)
    }

    pub fn resource_labels(&self) -> HashMap<String, String> {
        self.resource_labels
            .as_deref()
            .map(parse_label_list)
            .unwrap_or_default()
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            queue_capacity: self.queue_capacity,
            batch_size: self.batch_size,
            flush_interval: self.flush_interval,
            drop_policy: self.drop_policy,
            shutdown_timeout: self.shutdown_timeout,
        }
    }

    pub fn http_sink_config(&self) -> HttpSinkConfig {
        HttpSinkConfig {
            endpoint: self.endpoint.clone(),
            timeout: self.request_timeout,
            user_agent: concat!("log-grouper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

fn parse_label_list(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}
