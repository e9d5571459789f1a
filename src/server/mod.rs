pub mod handlers;
pub(crate) mod forward;
pub(crate) mod request_logging;
pub(crate) mod util;

use crate::config::Settings;
use crate::error::Result as AppResult;
use crate::providers::{HttpUpstream, UpstreamTransport};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Settings,
    pub upstream: Arc<dyn UpstreamTransport + Send + Sync>,
}

pub fn create_app(config: Settings) -> AppResult<Router> {
    let upstream = Arc::new(HttpUpstream::new(&config.upstream)?);
    Ok(build_router(config, upstream))
}

pub fn build_router(
    config: Settings,
    upstream: Arc<dyn UpstreamTransport + Send + Sync>,
) -> Router {
    let app_state = AppState { config, upstream };
    handlers::routes()
        .with_state(Arc::new(app_state))
        // inbound payloads are relayed whole, whatever their size
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
}

/// Startup banner; the API key is never logged beyond its first characters.
pub fn log_startup(config: &Settings) {
    let upstream = &config.upstream;
    tracing::info!(
        "Using API key: {}",
        util::key_preview(upstream.api_key.as_deref())
    );
    if upstream.api_key.is_none() {
        tracing::warn!("PANDOTATE_API_KEY is not set; forwarding with an empty bearer token");
    }
    tracing::info!("Forwarding to upstream: {}", upstream.url);
    tracing::info!("Request timeout set to: {} seconds", upstream.timeout_secs);
    tracing::info!("Slow threshold set to: {} ms", upstream.slow_threshold_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(url: String, timeout: Duration) -> Router {
        let mut settings = Settings::default();
        settings.upstream.url = url;
        settings.upstream.api_key = Some("sk-live".into());
        let upstream = HttpUpstream::with_timeout(&settings.upstream, timeout).unwrap();
        build_router(settings, Arc::new(upstream))
    }

    async fn post_inference(app: Router, body: Value) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/inference")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn relays_through_real_http_upstream() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sk-live"))
            .and(body_json(json!({"model": "m", "input": [1, 2]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "model": "m",
                "output": "o",
                "tokens": 3,
                "completion_tokens": 1,
                "id": "abc"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let app = app_for(mock_server.uri(), Duration::from_secs(5));
        let (status, body) = post_inference(app, json!({"model": "m", "input": [1, 2]})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({
                "model": "m",
                "output": "o",
                "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 3},
                "warning": "Ignored extra keys: ['id']"
            })
        );
    }

    #[tokio::test]
    async fn real_upstream_timeout_is_504_after_one_call() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(600)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = mock_server.uri();
        let app = app_for(url.clone(), Duration::from_millis(100));
        let (status, body) = post_inference(app, json!({"model": "m"})).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            body,
            json!({"error": "Upstream request timed out", "provider": url})
        );
    }

    #[tokio::test]
    async fn unreachable_upstream_is_502() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/inference", listener.local_addr().unwrap());
        drop(listener);

        let app = app_for(url.clone(), Duration::from_secs(5));
        let (status, body) = post_inference(app, json!({"model": "m"})).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], json!("Upstream provider failed"));
        assert_eq!(body["provider"], json!(url));
        assert!(body["details"].as_str().is_some_and(|d| !d.is_empty()));
    }
}
