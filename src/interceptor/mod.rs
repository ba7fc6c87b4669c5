//! The request interceptor.
//!
//! Every request that no explicit route claims lands here. Same-origin
//! page and API requests get the current user's ID token attached and the
//! auth-wait handshake is answered locally. Other same-origin requests go
//! upstream untouched. Foreign origins are relayed only when allowlisted.

pub mod filter;
pub mod forward;

use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use reqwest::Url;
use tracing::{debug, error, info_span, warn, Instrument};

use crate::auth::ExpectedUser;
use crate::config::InterceptorConfig;
use crate::metrics::MetricsRecorder;
use crate::state::AppState;
use crate::utils::http_helpers::{forward_failure_response, HTTPError};

pub use filter::{InterceptRules, Interception, AUTH_WAIT_PREFIX};
pub use forward::Forwarder;

pub struct Interceptor {
    pub rules: InterceptRules,
    pub forwarder: Forwarder,
    wait_timeout: Option<Duration>,
}

impl Interceptor {
    pub fn new(config: &InterceptorConfig) -> Result<Self, String> {
        let forwarder = Forwarder::new(config)?;
        let pass_through_origins = config
            .pass_through_origins
            .iter()
            .map(|origin| {
                Url::parse(origin).map_err(|e| {
                    format!("Invalid interceptor.pass_through_origins entry '{}': {}", origin, e)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Interceptor {
            rules: InterceptRules {
                origin: forwarder.origin().clone(),
                asset_prefix: config.asset_prefix.clone(),
                pass_through_origins,
            },
            forwarder,
            wait_timeout: config.wait_timeout_ms.map(Duration::from_millis),
        })
    }
}

/// Fallback handler: classifies the request and acts on it.
pub async fn intercept(State(state): State<AppState>, request: Request) -> Response {
    let interceptor = state.interceptor.clone();
    let Some(url) = interceptor.rules.request_url(request.uri()) else {
        return HTTPError::new(StatusCode::BAD_REQUEST, "Could not determine request URL")
            .into_response();
    };

    let interception = interceptor.rules.classify(&url, request.method());
    state.metrics.record_interception(interception.label());
    let span = info_span!(
        "intercept",
        method = %request.method(),
        path = url.path(),
        route = interception.label()
    );

    async move {
        match interception {
            Interception::PassThrough => forward(&state, request, &url, None).await,
            Interception::AttachToken => {
                let token = state.auth.id_token().await;
                forward(&state, request, &url, token.as_deref()).await
            }
            Interception::AuthWait(expected) => auth_wait(&state, &expected).await,
            Interception::Misdirected => {
                warn!("Refusing to relay to foreign origin {}", url.origin().ascii_serialization());
                HTTPError::new(
                    StatusCode::MISDIRECTED_REQUEST,
                    "This proxy does not serve the requested origin",
                )
                .into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn forward(
    state: &AppState,
    request: axum::http::Request<axum::body::Body>,
    url: &Url,
    token: Option<&str>,
) -> Response {
    let route = if token.is_some() { "with_token" } else { "without_token" };
    match state.interceptor.forwarder.forward(request, url, token).await {
        Ok(response) => {
            state.metrics.record_forward(route, "ok");
            response
        }
        Err(e) => {
            error!("Forwarding failed: {}", e);
            state.metrics.record_forward(route, "error");
            forward_failure_response()
        }
    }
}

/// Answers the auth-wait handshake once the expected identity is observed.
/// The response is never cacheable: a stale answer would defeat the check.
async fn auth_wait(state: &AppState, expected: &ExpectedUser) -> Response {
    let started = Instant::now();
    let wait = state.auth.wait_for_user(expected);

    let status = match state.interceptor.wait_timeout {
        None => {
            wait.await;
            StatusCode::OK
        }
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(()) => StatusCode::OK,
            Err(_) => {
                debug!("Auth wait for {:?} timed out after {:?}", expected, limit);
                StatusCode::GATEWAY_TIMEOUT
            }
        },
    };

    let result = if status == StatusCode::OK { "matched" } else { "timeout" };
    state
        .metrics
        .record_auth_wait(result, started.elapsed().as_secs_f64());

    (status, [(header::CACHE_CONTROL, "no-store")]).into_response()
}
