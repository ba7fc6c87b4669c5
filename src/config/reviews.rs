use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::reviews::firestore_store::FirestoreConfig;

/// A wrapper for the review store configuration:
/// - enabled: if false, every lookup fails (NoReviewStore).
/// - backend: the actual document store backend.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ReviewsConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub backend: Option<ReviewsBackend>,
}

/// The review store backends, selected via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
#[serde(tag = "type")]
pub enum ReviewsBackend {
    #[serde(rename = "firestore")]
    Firestore(FirestoreConfig),
}
