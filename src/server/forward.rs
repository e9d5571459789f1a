use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Map, Value};

use crate::error::{RelayError, Result};
use crate::providers::{NormalizedResponse, TransportError, UpstreamTransport, normalize};
use crate::server::request_logging::{
    duration_ms, log_attempt_failed, log_provider_call, log_slow_response, log_upstream_timeout,
};

pub const MAX_RETRIES: u32 = 1;
pub const RETRY_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub struct Forwarded {
    pub status: StatusCode,
    pub body: NormalizedResponse,
}

async fn attempt_once(
    upstream: &dyn UpstreamTransport,
    payload: &Map<String, Value>,
    attempt: u32,
) -> std::result::Result<(StatusCode, Duration, Map<String, Value>), TransportError> {
    let reply = upstream.send(payload).await?;
    log_provider_call(attempt, reply.status, reply.elapsed);
    let data = reply.json_object()?;
    Ok((reply.status, reply.elapsed, data))
}

/// Forwards `payload` upstream, retrying once after a non-timeout transport failure.
///
/// A timeout on the first attempt is returned immediately as `UpstreamTimeout`.
/// Any failure on the retry, timeout included, is `UpstreamFailure`.
pub async fn forward_with_retry(
    upstream: &dyn UpstreamTransport,
    payload: &Map<String, Value>,
    slow_threshold_ms: u64,
) -> Result<Forwarded> {
    let provider = upstream.provider();
    let mut attempt = 1;
    loop {
        match attempt_once(upstream, payload, attempt).await {
            Ok((status, elapsed, data)) => {
                let slow = duration_ms(elapsed) > slow_threshold_ms as f64;
                if slow {
                    log_slow_response(provider, elapsed, slow_threshold_ms);
                }
                return Ok(Forwarded {
                    status,
                    body: normalize(&data, slow),
                });
            }
            Err(err) if err.is_timeout() && attempt == 1 => {
                log_upstream_timeout(provider, &err);
                return Err(RelayError::UpstreamTimeout {
                    provider: provider.to_string(),
                });
            }
            Err(err) => {
                log_attempt_failed(provider, attempt, &err);
                if attempt > MAX_RETRIES {
                    return Err(RelayError::UpstreamFailure {
                        provider: provider.to_string(),
                        details: err.to_string(),
                    });
                }
                tokio::time::sleep(RETRY_DELAY).await;
                attempt += 1;
            }
        }
    }
}
