use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Upstream request timed out")]
    UpstreamTimeout { provider: String },

    #[error("Upstream provider failed: {details}")]
    UpstreamFailure { provider: String, details: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RelayError::UpstreamFailure { .. } => StatusCode::BAD_GATEWAY,
            RelayError::Http(_) | RelayError::Io(_) | RelayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            RelayError::InvalidInput(msg) => json!({ "error": msg }),
            RelayError::UpstreamTimeout { provider } => json!({
                "error": "Upstream request timed out",
                "provider": provider,
            }),
            RelayError::UpstreamFailure { provider, details } => json!({
                "error": "Upstream provider failed",
                "provider": provider,
                "details": details,
            }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
