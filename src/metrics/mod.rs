//! Prometheus metrics for the interceptor, the token path and the review
//! summary. Exposed on `/metrics`.

mod recorder;

pub use recorder::{Metrics, MetricsRecorder};
