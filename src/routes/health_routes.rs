//! Health check endpoint.

use crate::state::AppState;
use axum::{
    body::Body,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Returns 200 `OK` while the proxy is running, whether or not the auth
/// state has resolved.
async fn health_check() -> impl IntoResponse {
    Response::new(Body::from("OK"))
}
