use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::{firestore_store::FirestoreReviewStore, no_store::NoReviewStore};
use crate::config::{FirebaseConfig, ReviewsBackend, ReviewsConfig};
use crate::models::Review;

/// The ReviewStore trait abstracts read access to stored reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Returns the reviews of a restaurant, newest first.
    async fn reviews_for(&self, restaurant_id: &str) -> Result<Vec<Review>, String>;
}

/// Creates a concrete review store from the config. If `reviews.enabled =
/// false`, returns NoReviewStore. Otherwise, picks the specified backend.
pub fn create_review_store(
    config: &ReviewsConfig,
    firebase: &FirebaseConfig,
) -> Result<Arc<dyn ReviewStore>, String> {
    if !config.enabled {
        info!("Review store is disabled. Using NoReviewStore.");
        return Ok(Arc::new(NoReviewStore::new()));
    }

    match &config.backend {
        Some(ReviewsBackend::Firestore(firestore)) => {
            let store = FirestoreReviewStore::new(firestore, firebase)?;
            info!("Using Firestore review store for project '{}'.", store.project_id());
            Ok(Arc::new(store))
        }
        None => {
            error!("Review store is enabled, but no backend config is provided!");
            Err("reviews.enabled is true but no backend 'type' is configured".to_string())
        }
    }
}

/// Restaurant ids are Firestore document ids: non-empty, without '/', and
/// not a dot segment (URL joining would collapse those).
pub fn validate_restaurant_id(restaurant_id: &str) -> Result<(), String> {
    if restaurant_id.is_empty()
        || restaurant_id.contains('/')
        || restaurant_id == "."
        || restaurant_id == ".."
    {
        return Err(format!("Invalid restaurant id '{}'", restaurant_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firebase() -> FirebaseConfig {
        FirebaseConfig {
            api_key: "key".to_string(),
            project_id: "friendly-eats".to_string(),
            auth_domain: None,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
        }
    }

    #[tokio::test]
    async fn test_disabled_store() {
        let store = create_review_store(
            &ReviewsConfig {
                enabled: false,
                backend: None,
            },
            &firebase(),
        )
        .expect("disabled store is valid");
        assert_eq!(
            store.reviews_for("abc").await,
            Err("Review store is disabled".to_string())
        );
    }

    #[test]
    fn test_enabled_without_backend_is_an_error() {
        let result = create_review_store(
            &ReviewsConfig {
                enabled: true,
                backend: None,
            },
            &firebase(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_restaurant_id() {
        assert!(validate_restaurant_id("abc123").is_ok());
        assert!(validate_restaurant_id("").is_err());
        assert!(validate_restaurant_id("a/b").is_err());
        assert!(validate_restaurant_id(".").is_err());
        assert!(validate_restaurant_id("..").is_err());
        assert!(validate_restaurant_id("..abc").is_ok());
    }
}
