// HTTP surface of the proxy.
// Routes the search endpoint and a liveness probe.

pub mod envelope;
pub mod repos;

use axum::Json;
use axum::Router;
use axum::routing::{any, get};
use serde_json::{Value, json};

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/repos", any(repos::search_repositories))
        .with_state(state)
}

/// GET /ping - Liveness probe
async fn ping() -> Json<Value> {
    Json(json!({ "status": "pong" }))
}
