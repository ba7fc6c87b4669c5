use serde::{Deserialize, Serialize};

/// The User struct represents the identity currently signed in with the
/// identity provider.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub display_name: Option<String>,
    /// Provider-specific secret used to mint ID tokens (e.g. a refresh token).
    #[serde(skip_serializing, default)]
    pub credential: String,
}

impl User {
    /// Construct a new User with an optional display name.
    pub fn new(uid: String, display_name: Option<String>, credential: String) -> Self {
        User {
            uid,
            display_name,
            credential,
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("uid", &self.uid)
            .field("display_name", &self.display_name)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Credentials posted by the client when its auth state changes.
#[derive(Deserialize, Serialize, Clone)]
pub struct SessionCredentials {
    pub uid: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_never_serialized_or_printed() {
        let user = User::new(
            "alice".to_string(),
            Some("Alice".to_string()),
            "refresh-secret".to_string(),
        );

        let json = serde_json::to_string(&user).expect("serializes");
        assert!(!json.contains("refresh-secret"));
        assert!(json.contains("alice"));

        let debug = format!("{:?}", user);
        assert!(!debug.contains("refresh-secret"));
    }
}
