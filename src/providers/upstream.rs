use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};

use crate::config::UpstreamConfig;
use crate::error::Result;
use crate::http_client::client_with_timeout;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Transport-level outcome of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Raw upstream answer; any HTTP status counts as a transport success.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub elapsed: Duration,
}

impl UpstreamReply {
    /// Upstream body as a JSON object; anything else is reported as a failed attempt.
    pub fn json_object(&self) -> std::result::Result<Map<String, Value>, TransportError> {
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(TransportError::Other(format!(
                "Upstream response is not a JSON object: {}",
                json_kind(&other)
            ))),
            Err(e) => Err(TransportError::Other(format!(
                "Upstream response is not valid JSON: {}",
                e
            ))),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// 上游调用抽象（便于以脚本化实现替换真实 HTTP）
pub trait UpstreamTransport: Send + Sync {
    fn provider(&self) -> &str;
    fn send<'a>(
        &'a self,
        payload: &'a Map<String, Value>,
    ) -> BoxFuture<'a, std::result::Result<UpstreamReply, TransportError>>;
}

/// An unset key still produces the header, with an empty token.
pub fn bearer_value(api_key: Option<&str>) -> String {
    format!("Bearer {}", api_key.unwrap_or(""))
}

pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
    authorization: String,
}

impl HttpUpstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        Self::with_timeout(config, config.timeout())
    }

    pub fn with_timeout(config: &UpstreamConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: client_with_timeout(timeout)?,
            url: config.url.clone(),
            authorization: bearer_value(config.api_key.as_deref()),
        })
    }

    async fn post(
        &self,
        payload: &Map<String, Value>,
    ) -> std::result::Result<UpstreamReply, TransportError> {
        let start = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, &self.authorization)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(UpstreamReply {
            status,
            body,
            elapsed: start.elapsed(),
        })
    }
}

impl UpstreamTransport for HttpUpstream {
    fn provider(&self) -> &str {
        &self.url
    }

    fn send<'a>(
        &'a self,
        payload: &'a Map<String, Value>,
    ) -> BoxFuture<'a, std::result::Result<UpstreamReply, TransportError>> {
        Box::pin(async move { self.post(payload).await })
    }
}
