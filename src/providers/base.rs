use super::{
    plain_provider::{PlainProvider, PlainProviderConfig},
    securetoken_provider::{SecureTokenProvider, SecureTokenProviderConfig},
};
use crate::config::FirebaseConfig;
use crate::models::{SessionCredentials, User};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration options for the identity provider.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "securetoken")]
    SecureToken(SecureTokenProviderConfig),
    #[serde(rename = "plain")]
    Plain(PlainProviderConfig),
}

/// An identity provider owns token issuance. The proxy only asks it to
/// confirm a sign-in and to mint ID tokens for the signed-in user.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_type(&self) -> &str;
    /// Verifies session credentials and returns the user they belong to.
    async fn sign_in(&self, credentials: &SessionCredentials) -> Result<User, String>;
    /// Returns a current ID token for `user`, or `None` if none is available yet.
    async fn get_id_token(&self, user: &User) -> Result<Option<String>, String>;
}

/// Create an identity provider from a given config.
pub fn create_identity_provider(
    config: &ProviderConfig,
    firebase: &FirebaseConfig,
) -> Box<dyn IdentityProvider> {
    match config {
        ProviderConfig::SecureToken(cfg) => Box::new(SecureTokenProvider::new(cfg, firebase)),
        ProviderConfig::Plain(cfg) => Box::new(PlainProvider::new(cfg)),
    }
}
