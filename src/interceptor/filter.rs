//! Decides what the interceptor does with a request.

use axum::http::{Method, Uri};
use reqwest::Url;

use crate::auth::ExpectedUser;

/// Path prefix of the auth-wait handshake. The last segment is the uid.
pub const AUTH_WAIT_PREFIX: &str = "/__/auth/wait/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Forward untouched.
    PassThrough,
    /// Answer once the expected identity is observed.
    AuthWait(ExpectedUser),
    /// Forward with an ID token, if one can be obtained.
    AttachToken,
    /// Addressed to an origin we do not serve or relay to.
    Misdirected,
}

impl Interception {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Interception::PassThrough => "pass_through",
            Interception::AuthWait(_) => "auth_wait",
            Interception::AttachToken => "attach_token",
            Interception::Misdirected => "misdirected",
        }
    }
}

/// The rules a request is classified against.
#[derive(Debug, Clone)]
pub struct InterceptRules {
    pub origin: Url,
    pub asset_prefix: String,
    /// Foreign origins that absolute-form requests may be relayed to.
    pub pass_through_origins: Vec<Url>,
}

impl InterceptRules {
    pub fn classify(&self, url: &Url, method: &Method) -> Interception {
        if url.origin() != self.origin.origin() {
            let allowed = self
                .pass_through_origins
                .iter()
                .any(|allowed| allowed.origin() == url.origin());
            return if allowed {
                Interception::PassThrough
            } else {
                Interception::Misdirected
            };
        }

        let path = url.path();
        if let Some(rest) = path.strip_prefix(AUTH_WAIT_PREFIX) {
            let uid = rest.rsplit('/').next().unwrap_or_default();
            return Interception::AuthWait(ExpectedUser::from_path_segment(uid));
        }

        if !self.asset_prefix.is_empty() && path.starts_with(&self.asset_prefix) {
            return Interception::PassThrough;
        }

        // Paths with an extension are static assets (CSS, images, fonts, JSON...).
        if (method == Method::GET || method == Method::POST) && !path.contains('.') {
            return Interception::AttachToken;
        }

        Interception::PassThrough
    }

    /// Reconstructs the URL the client asked for. Origin-form targets
    /// (`/path?query`) always belong to our own origin, whatever the `Host`
    /// header says; only absolute-form targets can name another origin.
    pub fn request_url(&self, uri: &Uri) -> Option<Url> {
        if uri.scheme().is_some() && uri.authority().is_some() {
            return Url::parse(&uri.to_string()).ok();
        }

        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        self.origin.join(path_and_query).ok()
    }
}
