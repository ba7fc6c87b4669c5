//! Review summaries: fetch a restaurant's reviews, ask the model for a
//! one-sentence summary and render the result as an HTML fragment.

pub mod gemini;
pub mod outcome;
pub mod prompt;
pub mod render;

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use crate::metrics::{Metrics, MetricsRecorder};
use crate::reviews::ReviewStore;

pub use gemini::{GeminiClient, GeminiError, SummaryModel};
pub use outcome::{classify_failure, SummaryOutcome};
pub use render::{render, render_skeleton};

pub struct Summarizer {
    store: Arc<dyn ReviewStore>,
    model: Arc<dyn SummaryModel>,
    separator: char,
    metrics: Metrics,
}

impl Summarizer {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        model: Arc<dyn SummaryModel>,
        separator: char,
        metrics: Metrics,
    ) -> Self {
        Summarizer {
            store,
            model,
            separator,
            metrics,
        }
    }

    /// Runs the pipeline once. Never fails: errors become outcomes.
    pub async fn summarize(&self, restaurant_id: &str) -> SummaryOutcome {
        let started = Instant::now();
        let outcome = match self.run(restaurant_id).await {
            Ok(text) => SummaryOutcome::Summary(text),
            Err(e) => {
                error!("Summary for restaurant '{}' failed: {}", restaurant_id, e);
                classify_failure(e)
            }
        };
        self.metrics
            .record_summary(outcome.label(), started.elapsed().as_secs_f64());
        outcome
    }

    async fn run(&self, restaurant_id: &str) -> Result<String, String> {
        let reviews = self.store.reviews_for(restaurant_id).await?;
        info!(
            "Summarizing {} reviews for restaurant '{}'",
            reviews.len(),
            restaurant_id
        );
        let prompt = prompt::compose_prompt(&reviews, self.separator);
        self.model.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Review;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedStore(Result<Vec<Review>, String>);

    #[async_trait]
    impl ReviewStore for FixedStore {
        async fn reviews_for(&self, _restaurant_id: &str) -> Result<Vec<Review>, String> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingModel {
        reply: Option<Result<String, String>>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SummaryModel for RecordingModel {
        async fn generate(&self, prompt: &str) -> Result<String, String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().unwrap_or_else(|| Ok("ok".to_string()))
        }
    }

    fn summarizer(
        store: Result<Vec<Review>, String>,
        model: Arc<RecordingModel>,
    ) -> Summarizer {
        Summarizer::new(Arc::new(FixedStore(store)), model, '@', Metrics::new())
    }

    #[tokio::test]
    async fn test_summary_from_reviews() {
        let model = Arc::new(RecordingModel {
            reply: Some(Ok("Great tacos, slow service.".to_string())),
            ..Default::default()
        });
        let s = summarizer(
            Ok(vec![Review::new("1", "Great tacos"), Review::new("2", "Slow")]),
            model.clone(),
        );

        let outcome = s.summarize("abc").await;
        assert_eq!(
            outcome,
            SummaryOutcome::Summary("Great tacos, slow service.".to_string())
        );
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("Great tacos@Slow"));
    }

    #[tokio::test]
    async fn test_model_forbidden_is_permission_denied() {
        let model = Arc::new(RecordingModel {
            reply: Some(Err("Error fetching from x: [403 Forbidden] nope".to_string())),
            ..Default::default()
        });
        let s = summarizer(Ok(vec![]), model);
        assert_eq!(s.summarize("abc").await, SummaryOutcome::PermissionDenied);
    }

    #[tokio::test]
    async fn test_store_failure_skips_model() {
        let model = Arc::new(RecordingModel::default());
        let s = summarizer(Err("Review store is disabled".to_string()), model.clone());

        assert_eq!(
            s.summarize("abc").await,
            SummaryOutcome::Failed("Review store is disabled".to_string())
        );
        assert!(model.prompts.lock().unwrap().is_empty());
    }
}
