use super::resource::Resource;
use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::time::Duration;

/// Structured summary of a completed HTTP exchange, carried only on parent
/// records. Field names follow the backend's HTTP-request schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestSummary {
    pub request_method: String,
    pub request_url: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_size: Option<u64>,
    /// Wall-clock latency, serialized as seconds with 5-decimal precision
    /// and a trailing `s`, e.g. `"0.01234s"`.
    #[serde(
        serialize_with = "serialize_latency",
        deserialize_with = "deserialize_latency"
    )]
    pub latency: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

fn serialize_latency<S: Serializer>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.5}s", latency.as_secs_f64()))
}

fn deserialize_latency<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let secs = raw
        .trim_end_matches('s')
        .parse::<f64>()
        .map_err(serde::de::Error::custom)?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "latency must be a non-negative finite duration, got {raw:?}"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// A single log entry addressed to one log stream.
///
/// Parent records carry an [`HttpRequestSummary`] and no message; child
/// records carry the application message and no HTTP summary. Immutable once
/// constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub resource: Resource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_request: Option<HttpRequestSummary>,
}
