//! Server-rendered review summary fragments.

use axum::extract::{Path, State};
use axum::response::Html;
use axum::{routing::get, Router};

use crate::state::AppState;
use crate::summarizer::{render, render_skeleton};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/__/summary/restaurants/:restaurant_id",
            get(restaurant_summary),
        )
        .route("/__/summary/skeleton", get(skeleton))
}

/// Always 200: failures are part of the rendered fragment.
async fn restaurant_summary(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> Html<String> {
    let outcome = state.summarizer.summarize(&restaurant_id).await;
    Html(render(&outcome))
}

async fn skeleton() -> Html<String> {
    Html(render_skeleton())
}
