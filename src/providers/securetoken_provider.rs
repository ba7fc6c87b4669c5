#[allow(unused_imports)]
use cached::proc_macro::cached;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::FirebaseConfig;
use crate::models::{SessionCredentials, User};
use crate::providers::IdentityProvider;

/// Config for the Firebase secure-token provider.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct SecureTokenProviderConfig {
    pub name: String,
    #[serde(default = "default_uri")]
    pub uri: String,
    /// Overrides the `apiKey` from the registration's Firebase config.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_uri() -> String {
    "https://securetoken.googleapis.com/v1/token".to_string()
}

/// Provider that mints ID tokens by exchanging the user's refresh token at
/// the secure-token endpoint.
pub struct SecureTokenProvider {
    pub config: SecureTokenProviderConfig,
    api_key: String,
}

/// Result of a refresh-token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchange {
    pub id_token: String,
    pub refresh_token: String,
    pub user_id: String,
    #[serde(default)]
    pub expires_in: Option<String>,
}

impl SecureTokenProvider {
    pub fn new(config: &SecureTokenProviderConfig, firebase: &FirebaseConfig) -> Self {
        info!(
            "Creating secure-token provider '{}' for project '{}'",
            config.name, firebase.project_id
        );
        Self {
            api_key: config
                .api_key
                .clone()
                .unwrap_or_else(|| firebase.api_key.clone()),
            config: config.clone(),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for SecureTokenProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "securetoken"
    }

    async fn sign_in(&self, credentials: &SessionCredentials) -> Result<User, String> {
        let exchange = exchange_refresh_token(
            self.config.uri.clone(),
            self.api_key.clone(),
            credentials.refresh_token.clone(),
        )
        .await?;

        if exchange.user_id != credentials.uid {
            warn!(
                "Refresh token belongs to '{}', not '{}'",
                exchange.user_id, credentials.uid
            );
            return Err("Refresh token does not belong to the given uid".to_string());
        }

        Ok(User::new(
            exchange.user_id,
            None,
            credentials.refresh_token.clone(),
        ))
    }

    async fn get_id_token(&self, user: &User) -> Result<Option<String>, String> {
        let exchange = exchange_refresh_token(
            self.config.uri.clone(),
            self.api_key.clone(),
            user.credential.clone(),
        )
        .await?;
        debug!(
            "Got ID token for '{}' (expires in {}s)",
            user.uid,
            exchange.expires_in.as_deref().unwrap_or("?")
        );
        Ok(Some(exchange.id_token).filter(|token| !token.is_empty()))
    }
}

/// Exchanges a refresh token for a fresh ID token. Cached for 300s, well
/// inside the token's one hour lifetime.
#[cfg_attr(not(test), cached(time = 300, result = true))]
pub async fn exchange_refresh_token(
    uri: String,
    api_key: String,
    refresh_token: String,
) -> Result<TokenExchange, String> {
    debug!("Exchanging refresh token at {}", uri);
    let res = reqwest::Client::new()
        .post(&uri)
        .query(&[("key", api_key.as_str())])
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ])
        .send()
        .await
        .map_err(|e| format!("Failed to reach secure-token endpoint: {}", e))?;

    let status = res.status();
    if status.is_success() {
        res.json::<TokenExchange>()
            .await
            .map_err(|e| format!("Failed to parse token exchange response: {}", e))
    } else {
        let body: Value = res.json().await.unwrap_or(Value::Null);
        let reason = body
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error");
        Err(format!("Token exchange failed: {} ({})", status, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn firebase() -> FirebaseConfig {
        FirebaseConfig {
            api_key: "firebase-key".to_string(),
            project_id: "friendly-eats".to_string(),
            auth_domain: None,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
        }
    }

    fn provider_for(url: &str) -> SecureTokenProvider {
        SecureTokenProvider::new(
            &SecureTokenProviderConfig {
                name: "TestSecureToken".to_string(),
                uri: url.to_string(),
                api_key: None,
            },
            &firebase(),
        )
    }

    const EXCHANGE: &str = r#"{
        "access_token": "id-token-1",
        "expires_in": "3600",
        "token_type": "Bearer",
        "refresh_token": "refresh-1",
        "id_token": "id-token-1",
        "user_id": "alice",
        "project_id": "123"
    }"#;

    #[tokio::test]
    async fn test_sign_in_and_token_exchange() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/")
            .match_query(Matcher::UrlEncoded("key".into(), "firebase-key".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "refresh-1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EXCHANGE)
            .expect(2)
            .create_async()
            .await;

        let provider = provider_for(&server.url());
        let user = provider
            .sign_in(&SessionCredentials {
                uid: "alice".to_string(),
                refresh_token: "refresh-1".to_string(),
            })
            .await
            .expect("sign-in should succeed");
        assert_eq!(user.uid, "alice");

        let token = provider.get_id_token(&user).await;
        m.assert_async().await;
        assert_eq!(token, Ok(Some("id-token-1".to_string())));
    }

    #[tokio::test]
    async fn test_sign_in_rejects_foreign_uid() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EXCHANGE)
            .create_async()
            .await;

        let provider = provider_for(&server.url());
        let result = provider
            .sign_in(&SessionCredentials {
                uid: "mallory".to_string(),
                refresh_token: "refresh-1".to_string(),
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_expired_refresh_token() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"code": 400, "message": "TOKEN_EXPIRED"}}"#)
            .create_async()
            .await;

        let provider = provider_for(&server.url());
        let user = User::new("alice".to_string(), None, "refresh-1".to_string());
        let result = provider.get_id_token(&user).await;
        m.assert_async().await;

        let err = result.expect_err("exchange should fail");
        assert!(err.contains("400 Bad Request"), "unexpected error: {}", err);
        assert!(err.contains("TOKEN_EXPIRED"), "unexpected error: {}", err);
    }

    #[test]
    fn test_api_key_override() {
        let provider = SecureTokenProvider::new(
            &SecureTokenProviderConfig {
                name: "TestSecureToken".to_string(),
                uri: default_uri(),
                api_key: Some("override".to_string()),
            },
            &firebase(),
        );
        assert_eq!(provider.api_key, "override");
    }
}
