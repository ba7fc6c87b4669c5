use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::auth_state::AuthState;
use crate::config::TokenRetryConfig;
use crate::metrics::{Metrics, MetricsRecorder};
use crate::models::{SessionCredentials, User};
use crate::providers::IdentityProvider;
use crate::utils::log_throttle::should_emit;

const EXHAUSTED_LOG_WINDOW: Duration = Duration::from_secs(30);

/// The identity a caller of the wait endpoint expects to be signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedUser {
    SignedOut,
    Uid(String),
}

impl ExpectedUser {
    /// Parses the last segment of the wait path; the literal `undefined`
    /// means the caller expects nobody to be signed in.
    pub fn from_path_segment(segment: &str) -> Self {
        if segment == "undefined" {
            ExpectedUser::SignedOut
        } else {
            ExpectedUser::Uid(segment.to_string())
        }
    }

    pub fn matches(&self, user: Option<&User>) -> bool {
        match (self, user) {
            (ExpectedUser::SignedOut, None) => true,
            (ExpectedUser::Uid(uid), Some(user)) => *uid == user.uid,
            _ => false,
        }
    }
}

/// Holds the auth state, the identity provider and the token retry policy.
pub struct Auth {
    pub state: Arc<AuthState>,
    provider: Box<dyn IdentityProvider>,
    retry: TokenRetryConfig,
    metrics: Metrics,
}

impl Auth {
    pub fn new(
        provider: Box<dyn IdentityProvider>,
        retry: TokenRetryConfig,
        metrics: Metrics,
    ) -> Self {
        info!(
            "Using identity provider '{}' ({})",
            provider.get_name(),
            provider.get_type()
        );
        Auth {
            state: Arc::new(AuthState::new()),
            provider,
            retry,
            metrics,
        }
    }

    /// Verifies the credentials with the provider and, on success, makes
    /// their owner the current user.
    pub async fn sign_in(&self, credentials: &SessionCredentials) -> Result<User, String> {
        let user = self.provider.sign_in(credentials).await?;
        info!("User '{}' signed in", user.uid);
        self.state.update(Some(user.clone()));
        Ok(user)
    }

    pub fn sign_out(&self) {
        info!("Signed out");
        self.state.update(None);
    }

    /// Returns an ID token for the current user, retrying a bounded number of
    /// times when none is available. `None` means "forward without a token".
    pub async fn id_token(&self) -> Option<String> {
        let started = Instant::now();
        let attempts = self.retry.attempts.max(1);
        let delay = Duration::from_millis(self.retry.delay_ms);

        for attempt in 1..=attempts {
            if attempt > 1 {
                sleep(delay).await;
            }
            if let Some(token) = self.attempt_id_token(attempt).await {
                self.metrics
                    .record_token_retrieval("token", started.elapsed().as_secs_f64());
                return Some(token);
            }
        }

        if let Some(suppressed) = should_emit("auth.id_token.exhausted", EXHAUSTED_LOG_WINDOW) {
            warn!(
                attempts,
                suppressed, "No ID token after all attempts; forwarding without one"
            );
        }
        self.metrics
            .record_token_retrieval("none", started.elapsed().as_secs_f64());
        None
    }

    async fn attempt_id_token(&self, attempt: u32) -> Option<String> {
        let Some(user) = self.state.ready().await else {
            debug!("Attempt {}: nobody is signed in", attempt);
            self.metrics
                .record_token_attempt(self.provider.get_name(), "signed_out");
            return None;
        };

        match self.provider.get_id_token(&user).await {
            Ok(Some(token)) => {
                self.metrics
                    .record_token_attempt(self.provider.get_name(), "token");
                Some(token)
            }
            Ok(None) => {
                debug!("Attempt {}: no token yet for '{}'", attempt, user.uid);
                self.metrics
                    .record_token_attempt(self.provider.get_name(), "empty");
                None
            }
            Err(e) => {
                warn!(
                    "Attempt {}: provider '{}' failed for '{}': {}",
                    attempt,
                    self.provider.get_name(),
                    user.uid,
                    e
                );
                self.metrics
                    .record_token_attempt(self.provider.get_name(), "error");
                None
            }
        }
    }

    /// Resolves once the observed current user is the expected one. There is
    /// no deadline here; callers that want one wrap this in a timeout.
    pub async fn wait_for_user(&self, expected: &ExpectedUser) {
        let mut subscription = self.state.subscribe();
        loop {
            let user = subscription.next().await;
            if expected.matches(user.as_ref()) {
                debug!("Auth wait matched {:?}", expected);
                return;
            }
        }
    }
}
