use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::app::SharedState;
use statserve_api::StatsApiLayer;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// Server routes plus the stats middleware in front of them. The fallback
/// stands in for the file-serving handler this API is meant to wrap.
pub fn build_router(state: SharedState) -> Router {
    let stats = StatsApiLayer::new(&state.config.base_path(), state.config.root());
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(stats)
        .with_state(state)
}

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    crate::metrics::inc_api_request("/health");
    Json(Health {
        status: "ok",
        version: state.version,
    })
}

async fn metrics() -> impl IntoResponse {
    crate::metrics::inc_api_request("/metrics");
    let body = crate::metrics::gather_prometheus(env!("CARGO_PKG_VERSION"));
    ([("Content-Type", "text/plain; version=0.0.4")], body)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing here\n")
}
