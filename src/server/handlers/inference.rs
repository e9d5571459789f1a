use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::RelayError;
use crate::server::AppState;
use crate::server::forward::forward_with_retry;
use crate::server::util::is_json_content_type;

const INVALID_JSON_BODY: &str = "Invalid JSON body";
const MODEL_REQUIRED: &str = "model field is required";

fn parse_payload(headers: &HeaderMap, body: &[u8]) -> Result<Map<String, Value>, RelayError> {
    if !is_json_content_type(headers) {
        return Err(RelayError::InvalidInput(INVALID_JSON_BODY.into()));
    }
    let payload = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => return Err(RelayError::InvalidInput(INVALID_JSON_BODY.into())),
    };
    if !payload.contains_key("model") {
        return Err(RelayError::InvalidInput(MODEL_REQUIRED.into()));
    }
    Ok(payload)
}

pub async fn inference(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    let payload = parse_payload(&headers, &body).inspect_err(|e| {
        tracing::debug!(error = %e, "rejected inference request");
    })?;

    let forwarded = forward_with_retry(
        app_state.upstream.as_ref(),
        &payload,
        app_state.config.upstream.slow_threshold_ms,
    )
    .await?;

    Ok((forwarded.status, Json(forwarded.body)).into_response())
}
