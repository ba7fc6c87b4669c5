//! Application startup and server initialization.
//!
//! Parses the registration config, builds the identity provider, the
//! interceptor and the summarizer, and serves the router.

use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::Auth;
use crate::config::{firebase_config_from_registration, ConfigV1};
use crate::interceptor::Interceptor;
use crate::metrics::Metrics;
use crate::providers::create_identity_provider;
use crate::reviews::create_review_store;
use crate::routes;
use crate::state::AppState;
use crate::summarizer::{GeminiClient, Summarizer};

/// Builds the shared state. Any configuration problem, including a
/// registration without `firebaseConfig`, is returned as an error.
pub fn build_state(config: &ConfigV1) -> Result<AppState, Box<dyn Error>> {
    let firebase = firebase_config_from_registration(&config.interceptor.registration)?;
    info!("Loaded Firebase config for project '{}'", firebase.project_id);

    let metrics = Metrics::new();

    let provider = create_identity_provider(&config.provider, &firebase);
    let auth = Arc::new(Auth::new(
        provider,
        config.interceptor.token_retry.clone(),
        metrics.clone(),
    ));
    // No session survives a restart: the provider's first word is "nobody".
    auth.state.update(None);

    let interceptor = Arc::new(Interceptor::new(&config.interceptor)?);

    let store = create_review_store(&config.reviews, &firebase)?;
    let model = Arc::new(GeminiClient::new(&config.summarizer)?);
    let summarizer = Arc::new(Summarizer::new(
        store,
        model,
        config.summarizer.separator,
        metrics.clone(),
    ));

    Ok(AppState {
        auth,
        interceptor,
        summarizer,
        metrics,
    })
}

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the state cannot be built, the listener cannot be
/// bound, or the server fails while running.
pub async fn run(config: ConfigV1) -> Result<(), Box<dyn Error>> {
    let state = build_state(&config)?;
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .map_err(|e| format!("Could not bind to {}: {}", config.bind_address, e))?;
    info!(
        "Proxying {} -> {} on {}",
        config.interceptor.origin, config.interceptor.upstream, config.bind_address
    );

    axum::serve(listener, app).await?;
    Ok(())
}
