use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{validate_restaurant_id, ReviewStore};
use crate::config::FirebaseConfig;
use crate::models::Review;

/// Firestore review store configuration.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FirestoreConfig {
    /// Defaults to the registration's `projectId`.
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_database")]
    pub database: String,
    /// Server-side OAuth access token (service account). Never the end user's.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    10
}

/// Reads `restaurants/<id>/ratings` through the Firestore REST API.
pub struct FirestoreReviewStore {
    client: Client,
    base_url: Url,
    project_id: String,
    database: String,
    access_token: Option<String>,
    page_size: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl Document {
    fn string_field(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)?
            .get("stringValue")?
            .as_str()
            .map(str::to_string)
    }

    fn integer_field(&self, key: &str) -> Option<i64> {
        let value = self.fields.get(key)?;
        // Firestore encodes int64 as a string; doubles are plain numbers.
        if let Some(raw) = value.get("integerValue") {
            return match raw {
                Value::String(s) => s.parse().ok(),
                other => other.as_i64(),
            };
        }
        value
            .get("doubleValue")
            .and_then(Value::as_f64)
            .map(|f| f.round() as i64)
    }

    fn timestamp_field(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.fields.get(key)?.get("timestampValue")?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    fn into_review(self) -> Review {
        let id = self.name.rsplit('/').next().unwrap_or_default().to_string();
        Review {
            text: self.string_field("text").unwrap_or_default(),
            rating: self.integer_field("rating"),
            user_name: self.string_field("userName"),
            timestamp: self.timestamp_field("timestamp"),
            id,
        }
    }
}

impl FirestoreReviewStore {
    pub fn new(config: &FirestoreConfig, firebase: &FirebaseConfig) -> Result<Self, String> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| format!("Invalid Firestore base_url '{}': {}", config.base_url, e))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("Could not build HTTP client: {}", e))?;

        Ok(FirestoreReviewStore {
            client,
            base_url,
            project_id: config
                .project_id
                .clone()
                .unwrap_or_else(|| firebase.project_id.clone()),
            database: config.database.clone(),
            access_token: config.access_token.clone(),
            page_size: config.page_size,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn ratings_url(&self, restaurant_id: &str) -> Result<Url, String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| format!("Firestore base_url '{}' cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                &self.project_id,
                "databases",
                &self.database,
                "documents",
                "restaurants",
                restaurant_id,
                "ratings",
            ]);
        Ok(url)
    }

    async fn fetch_page(
        &self,
        url: &Url,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse, String> {
        let page_size = self.page_size.to_string();
        let mut query = vec![("orderBy", "timestamp desc"), ("pageSize", page_size.as_str())];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let mut request = self.client.get(url.clone()).query(&query);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let res = request
            .send()
            .await
            .map_err(|e| format!("Error fetching reviews from Firestore: {}", e))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(format!(
                "Error fetching reviews from Firestore: [{}] {}",
                status,
                body.trim()
            ));
        }

        res.json::<ListDocumentsResponse>()
            .await
            .map_err(|e| format!("Failed to parse Firestore response: {}", e))
    }
}

#[async_trait]
impl ReviewStore for FirestoreReviewStore {
    async fn reviews_for(&self, restaurant_id: &str) -> Result<Vec<Review>, String> {
        validate_restaurant_id(restaurant_id)?;
        let url = self.ratings_url(restaurant_id)?;

        let mut reviews = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.fetch_page(&url, page_token.as_deref()).await?;
            reviews.extend(page.documents.into_iter().map(Document::into_review));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            "Fetched {} reviews for restaurant '{}'",
            reviews.len(),
            restaurant_id
        );
        Ok(reviews)
    }
}
