//! Client for the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::SummarizerConfig;

/// A text-in, text-out generative model.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, String>;
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Error fetching from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// `StatusCode` displays as e.g. `403 Forbidden`.
    #[error("Error fetching from {url}: [{status}] {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },
    #[error("Failed to parse response: {0}")]
    Parse(#[from] reqwest::Error),
    #[error("Prompt was blocked due to {0}")]
    Blocked(String),
    #[error("Candidate was blocked due to {0}")]
    CandidateBlocked(String),
    #[error("Response contained no text")]
    EmptyResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SafetySetting {
    pub category: &'static str,
    pub threshold: &'static str,
}

/// Review text trips the harassment and hate-speech filters too eagerly.
pub fn relaxed_safety_settings() -> Vec<SafetySetting> {
    ["HARM_CATEGORY_HARASSMENT", "HARM_CATEGORY_HATE_SPEECH"]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_NONE",
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiClient {
    pub fn new(config: &SummarizerConfig) -> Result<Self, String> {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| format!("Invalid Gemini endpoint '{}': {}", endpoint, e))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("Could not build HTTP client: {}", e))?;

        Ok(GeminiClient {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            safety_settings: relaxed_safety_settings(),
        })
    }

    #[cfg(test)]
    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one `generateContent` request and returns the candidate text.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            safety_settings: self.safety_settings.clone(),
        };

        debug!("Calling Gemini at {}", self.endpoint);
        let res = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| GeminiError::Request {
                url: self.endpoint.to_string(),
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            let raw = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(GeminiError::Status {
                url: self.endpoint.to_string(),
                status,
                message,
            });
        }

        let parsed: GenerateContentResponse = res.json().await?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, GeminiError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GeminiError::Blocked(reason));
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GeminiError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if !text.is_empty() {
        return Ok(text);
    }
    match candidate.finish_reason.as_deref() {
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
            Err(GeminiError::CandidateBlocked(
                candidate.finish_reason.unwrap_or_default(),
            ))
        }
        _ => Err(GeminiError::EmptyResponse),
    }
}

#[async_trait]
impl SummaryModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, String> {
        self.generate_content(prompt).await.map_err(|e| e.to_string())
    }
}
