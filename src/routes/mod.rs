//! HTTP route definitions and handlers.
//!
//! The proxy's own endpoints (health, metrics, session, summaries) are
//! explicit routes; every other request falls through to the interceptor.

mod health_routes;
mod metrics_routes;
mod session_routes;
mod summary_routes;

pub use session_routes::SESSION_PATH;

use crate::interceptor;
use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes::routes())
        .merge(metrics_routes::routes())
        .merge(session_routes::routes())
        .merge(summary_routes::routes())
        .fallback(interceptor::intercept)
        .with_state(state)
}
