use super::{LogSink, SinkError};
use crate::domain::LogRecord;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSinkConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9600/v1/logs".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("log-grouper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Ships batches as NDJSON POSTs, one request per named stream batch.
///
/// The backend contract is fire-and-forget: a non-2xx response surfaces as a
/// typed error to the flush worker and goes no further.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: Url,
}

impl HttpSink {
    pub fn new(config: HttpSinkConfig) -> Result<Self, SinkError> {
        let endpoint: Url = config
            .endpoint
            .parse()
            .map_err(|e| SinkError::InvalidConfig(format!("invalid endpoint URL: {e}")))?;

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| SinkError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    fn serialize_ndjson(records: &[LogRecord]) -> Result<String, SinkError> {
        let mut body = String::new();
        for record in records {
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }
        Ok(body)
    }

    fn build_headers(log_name: &str, batch_id: &str, size: usize) -> Result<HeaderMap, SinkError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-ndjson"));
        headers.insert(
            HeaderName::from_static("x-log-name"),
            HeaderValue::from_str(log_name)
                .map_err(|e| SinkError::InvalidConfig(format!("invalid log name: {e}")))?,
        );
        headers.insert(
            HeaderName::from_static("x-batch-id"),
            HeaderValue::from_str(batch_id)
                .map_err(|e| SinkError::InvalidConfig(format!("invalid batch id: {e}")))?,
        );
        headers.insert(
            HeaderName::from_static("x-batch-size"),
            HeaderValue::from_str(&size.to_string())
                .map_err(|e| SinkError::InvalidConfig(format!("invalid batch size: {e}")))?,
        );
        Ok(headers)
    }
}

impl LogSink for HttpSink {
    async fn write(&self, log_name: &str, records: &[LogRecord]) -> Result<(), SinkError> {
        let batch_id = Uuid::new_v4().to_string();
        let body = Self::serialize_ndjson(records)?;
        let headers = Self::build_headers(log_name, &batch_id, records.len())?;

        debug!(
            log_name,
            batch_id,
            entries = records.len(),
            "sending log batch"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(headers)
            .body(body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SinkError::Http {
                status: response.status().as_u16(),
            })
        }
    }
}
