use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{SessionCredentials, User};
use crate::providers::IdentityProvider;

/// A single statically configured user.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct PlainUserEntry {
    pub uid: String,
    pub secret: String,
    /// Token handed out for this user; unset means "no token available".
    pub id_token: Option<String>,
    pub display_name: Option<String>,
}

/// The config for a static, in-memory identity provider.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct PlainProviderConfig {
    pub name: String,
    pub users: Vec<PlainUserEntry>,
}

/// Identity provider backed by the user list in the config. Meant for
/// local development and tests, where no real identity service exists.
pub struct PlainProvider {
    pub config: PlainProviderConfig,
}

impl PlainProvider {
    pub fn new(config: &PlainProviderConfig) -> Self {
        info!(
            "Creating plain identity provider '{}' with {} users",
            config.name,
            config.users.len()
        );
        Self {
            config: config.clone(),
        }
    }

    fn find(&self, uid: &str) -> Option<&PlainUserEntry> {
        self.config.users.iter().find(|entry| entry.uid == uid)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for PlainProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "plain"
    }

    async fn sign_in(&self, credentials: &SessionCredentials) -> Result<User, String> {
        debug!("Plain sign-in attempt for uid '{}'", credentials.uid);
        match self.find(&credentials.uid) {
            Some(entry) if entry.secret == credentials.refresh_token => Ok(User::new(
                entry.uid.clone(),
                entry.display_name.clone(),
                entry.secret.clone(),
            )),
            _ => Err("Unknown uid or wrong secret".to_string()),
        }
    }

    async fn get_id_token(&self, user: &User) -> Result<Option<String>, String> {
        let entry = self
            .find(&user.uid)
            .ok_or_else(|| format!("User '{}' is not configured", user.uid))?;
        if entry.secret != user.credential {
            return Err(format!("Credential for '{}' is no longer valid", user.uid));
        }
        Ok(entry.id_token.clone())
    }
}
