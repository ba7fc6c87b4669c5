//! Shared application state.

use crate::auth::Auth;
use crate::interceptor::Interceptor;
use crate::metrics::Metrics;
use crate::summarizer::Summarizer;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Auth state, identity provider and token retry policy.
    pub auth: Arc<Auth>,
    /// Request classification and forwarding.
    pub interceptor: Arc<Interceptor>,
    pub summarizer: Arc<Summarizer>,
    pub metrics: Metrics,
}
