//! Session endpoints through which the browser tells the proxy who is
//! signed in.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::models::SessionCredentials;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

pub const SESSION_PATH: &str = "/__/auth/session";

pub fn routes() -> Router<AppState> {
    Router::new().route(
        SESSION_PATH,
        get(session_status).post(sign_in).delete(sign_out),
    )
}

#[derive(Serialize)]
struct SessionStatus {
    ready: bool,
    uid: Option<String>,
}

async fn session_status(State(state): State<AppState>) -> Json<SessionStatus> {
    let snapshot = state.auth.state.snapshot();
    Json(SessionStatus {
        ready: snapshot.is_ready(),
        uid: snapshot.uid().map(str::to_string),
    })
}

async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<SessionCredentials>,
) -> Result<impl IntoResponse, HTTPError> {
    match state.auth.sign_in(&credentials).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            warn!("Sign-in for '{}' rejected: {}", credentials.uid, e);
            Err(HTTPError::new(StatusCode::UNAUTHORIZED, e))
        }
    }
}

async fn sign_out(State(state): State<AppState>) -> StatusCode {
    state.auth.sign_out();
    StatusCode::NO_CONTENT
}
