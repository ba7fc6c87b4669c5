use super::ReviewStore;
use crate::models::Review;
use async_trait::async_trait;

/// A review store that always fails, used when reviews are disabled.
pub struct NoReviewStore;

impl NoReviewStore {
    pub fn new() -> Self {
        NoReviewStore
    }
}

impl Default for NoReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewStore for NoReviewStore {
    async fn reviews_for(&self, _restaurant_id: &str) -> Result<Vec<Review>, String> {
        Err("Review store is disabled".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_store_reviews_for() {
        let store = NoReviewStore::new();
        let res = store.reviews_for("abc").await;
        assert_eq!(res, Err("Review store is disabled".to_string()));
    }
}
