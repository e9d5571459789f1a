use std::time::Duration;

use axum::http::StatusCode;

use crate::providers::TransportError;

pub fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

// 记录上游调用耗时
pub fn log_provider_call(attempt: u32, status: StatusCode, elapsed: Duration) {
    let ms = duration_ms(elapsed);
    tracing::info!(
        attempt,
        status = status.as_u16(),
        duration_ms = ms,
        "Provider call took {:.2} ms",
        ms
    );
}

pub fn log_slow_response(provider: &str, elapsed: Duration, threshold_ms: u64) {
    tracing::warn!(
        provider,
        duration_ms = duration_ms(elapsed),
        threshold_ms,
        "slow upstream response"
    );
}

pub fn log_upstream_timeout(provider: &str, err: &TransportError) {
    tracing::error!(provider, error = %err, "Upstream request timed out");
}

pub fn log_attempt_failed(provider: &str, attempt: u32, err: &TransportError) {
    tracing::error!(provider, attempt, "Attempt {} failed: {}", attempt, err);
}
