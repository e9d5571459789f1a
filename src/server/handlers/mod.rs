use axum::{Router, routing::post};
use std::sync::Arc;

use crate::server::AppState;

mod inference;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/inference", post(inference::inference))
}
