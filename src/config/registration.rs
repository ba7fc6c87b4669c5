//! Parsing of the registration URL that carries the Firebase configuration.
//!
//! The interceptor is registered with a URL such as
//! `/auth-service-worker.js?firebaseConfig=<url-encoded JSON>`. The JSON
//! payload is required: without it the proxy cannot talk to the identity
//! provider, so startup must fail.

use reqwest::Url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Query-string key holding the serialized configuration.
pub const REGISTRATION_KEY: &str = "firebaseConfig";

/// Client-side Firebase configuration, as handed to the browser SDK.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default)]
    pub storage_bucket: Option<String>,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Firebase Config object not found in registration query string")]
    MissingConfig,
    #[error("Invalid registration URL '{0}': {1}")]
    InvalidUrl(String, String),
    #[error("Invalid Firebase Config object: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

/// Extracts the Firebase configuration from a registration URL.
///
/// Accepts absolute URLs, relative URLs and bare query strings
/// (with or without the leading `?`).
pub fn firebase_config_from_registration(
    registration: &str,
) -> Result<FirebaseConfig, RegistrationError> {
    let base = Url::parse("http://registration.invalid/")
        .map_err(|e| RegistrationError::InvalidUrl(registration.to_string(), e.to_string()))?;

    let trimmed = registration.trim();
    let url = if trimmed.contains('?') || trimmed.contains("://") || trimmed.starts_with('/') {
        base.join(trimmed)
    } else {
        base.join(&format!("?{}", trimmed))
    }
    .map_err(|e| RegistrationError::InvalidUrl(registration.to_string(), e.to_string()))?;

    let serialized = url
        .query_pairs()
        .find(|(key, _)| key == REGISTRATION_KEY)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(RegistrationError::MissingConfig)?;

    Ok(serde_json::from_str(&serialized)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENCODED: &str = "%7B%22apiKey%22%3A%22key-123%22%2C%22projectId%22%3A%22friendly-eats%22%2C%22authDomain%22%3A%22friendly-eats.firebaseapp.com%22%7D";

    #[test]
    fn test_config_from_relative_url() {
        let registration = format!("/auth-service-worker.js?firebaseConfig={}", ENCODED);
        let config = firebase_config_from_registration(&registration).expect("should parse");
        assert_eq!(config.api_key, "key-123");
        assert_eq!(config.project_id, "friendly-eats");
        assert_eq!(
            config.auth_domain.as_deref(),
            Some("friendly-eats.firebaseapp.com")
        );
        assert_eq!(config.app_id, None);
    }

    #[test]
    fn test_config_from_bare_query() {
        let registration = format!("firebaseConfig={}", ENCODED);
        let config = firebase_config_from_registration(&registration).expect("should parse");
        assert_eq!(config.project_id, "friendly-eats");

        let registration = format!("?other=1&firebaseConfig={}", ENCODED);
        let config = firebase_config_from_registration(&registration).expect("should parse");
        assert_eq!(config.api_key, "key-123");
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let result = firebase_config_from_registration("/auth-service-worker.js");
        assert!(matches!(result, Err(RegistrationError::MissingConfig)));

        let result = firebase_config_from_registration("/auth-service-worker.js?firebaseConfig=");
        assert!(matches!(result, Err(RegistrationError::MissingConfig)));
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let result = firebase_config_from_registration("?firebaseConfig=not-json");
        assert!(matches!(result, Err(RegistrationError::InvalidConfig(_))));
    }
}
