//! Metrics recording implementation using Prometheus.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records how the interceptor classified a request.
    fn record_interception(&self, route: &str);

    /// Records the outcome of a forwarded request ("ok" or "error").
    fn record_forward(&self, route: &str, result: &str);

    /// Records a single ID-token attempt against the identity provider.
    fn record_token_attempt(&self, provider_name: &str, result: &str);

    /// Records the final outcome of a token retrieval ("token" or "none").
    fn record_token_retrieval(&self, result: &str, duration_secs: f64);

    /// Records how long an auth-wait handshake took.
    fn record_auth_wait(&self, result: &str, duration_secs: f64);

    /// Records a rendered review summary outcome.
    fn record_summary(&self, outcome: &str, duration_secs: f64);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // Interceptor metrics
    intercepted_requests_total: CounterVec,
    forwarded_requests_total: CounterVec,

    // Token metrics
    token_attempts_total: CounterVec,
    token_retrieval_duration_seconds: HistogramVec,

    // Auth-wait metrics
    auth_wait_duration_seconds: HistogramVec,

    // Summary metrics
    summary_duration_seconds: HistogramVec,
}

impl Metrics {
    /// Creates a new metrics instance with a Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let intercepted_requests_total = register_counter_vec_with_registry!(
            Opts::new(
                "intercepted_requests_total",
                "Total number of requests seen by the interceptor"
            ),
            &["route"],
            registry.clone()
        )
        .expect("Failed to register intercepted_requests_total");

        let forwarded_requests_total = register_counter_vec_with_registry!(
            Opts::new(
                "forwarded_requests_total",
                "Total number of requests forwarded upstream"
            ),
            &["route", "result"],
            registry.clone()
        )
        .expect("Failed to register forwarded_requests_total");

        let token_attempts_total = register_counter_vec_with_registry!(
            Opts::new(
                "id_token_attempts_total",
                "Total ID token attempts per identity provider"
            ),
            &["provider_name", "result"],
            registry.clone()
        )
        .expect("Failed to register id_token_attempts_total");

        let token_retrieval_duration_seconds = register_histogram_vec_with_registry!(
            "id_token_retrieval_duration_seconds",
            "ID token retrieval duration in seconds, retries included",
            &["result"],
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
            registry.clone()
        )
        .expect("Failed to register id_token_retrieval_duration_seconds");

        let auth_wait_duration_seconds = register_histogram_vec_with_registry!(
            "auth_wait_duration_seconds",
            "Time until the awaited identity was observed",
            &["result"],
            vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0],
            registry.clone()
        )
        .expect("Failed to register auth_wait_duration_seconds");

        let summary_duration_seconds = register_histogram_vec_with_registry!(
            "review_summary_duration_seconds",
            "Review summary duration in seconds",
            &["outcome"],
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0],
            registry.clone()
        )
        .expect("Failed to register review_summary_duration_seconds");

        Metrics {
            registry,
            intercepted_requests_total,
            forwarded_requests_total,
            token_attempts_total,
            token_retrieval_duration_seconds,
            auth_wait_duration_seconds,
            summary_duration_seconds,
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder for Metrics {
    fn record_interception(&self, route: &str) {
        self.intercepted_requests_total
            .with_label_values(&[route])
            .inc();
    }

    fn record_forward(&self, route: &str, result: &str) {
        self.forwarded_requests_total
            .with_label_values(&[route, result])
            .inc();
    }

    fn record_token_attempt(&self, provider_name: &str, result: &str) {
        self.token_attempts_total
            .with_label_values(&[provider_name, result])
            .inc();
    }

    fn record_token_retrieval(&self, result: &str, duration_secs: f64) {
        self.token_retrieval_duration_seconds
            .with_label_values(&[result])
            .observe(duration_secs);
    }

    fn record_auth_wait(&self, result: &str, duration_secs: f64) {
        self.auth_wait_duration_seconds
            .with_label_values(&[result])
            .observe(duration_secs);
    }

    fn record_summary(&self, outcome: &str, duration_secs: f64) {
        self.summary_duration_seconds
            .with_label_values(&[outcome])
            .observe(duration_secs);
    }
}
