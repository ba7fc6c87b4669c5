//! Forwarding of intercepted requests to the network.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::response::Response;
use http::{header, HeaderMap, HeaderValue, Request};
use reqwest::{redirect, Client, Url};
use tracing::{debug, warn};

use crate::config::InterceptorConfig;

/// Headers that describe a single connection and must not be copied across.
const HOP_BY_HOP: [header::HeaderName; 5] = [
    header::CONNECTION,
    header::HOST,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

pub struct Forwarder {
    client: Client,
    origin: Url,
    upstream: Url,
    max_body_bytes: usize,
}

impl Forwarder {
    pub fn new(config: &InterceptorConfig) -> Result<Self, String> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| format!("Invalid interceptor.origin '{}': {}", config.origin, e))?;
        let upstream = Url::parse(&config.upstream)
            .map_err(|e| format!("Invalid interceptor.upstream '{}': {}", config.upstream, e))?;
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_millis(config.forward_timeout_ms))
            .build()
            .map_err(|e| format!("Could not build HTTP client: {}", e))?;

        Ok(Forwarder {
            client,
            origin,
            upstream,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Same-origin requests go to the upstream server with path and query
    /// preserved. Foreign URLs are only handed in once they passed the
    /// pass-through allowlist.
    pub fn target_for(&self, url: &Url) -> Url {
        if url.origin() != self.origin.origin() {
            return url.clone();
        }
        let mut target = self.upstream.clone();
        target.set_path(url.path());
        target.set_query(url.query());
        target
    }

    /// Sends `request` to the network, optionally carrying a bearer token.
    /// Any `Authorization` header from the client is replaced, not duplicated.
    pub async fn forward(
        &self,
        request: Request<Body>,
        url: &Url,
        token: Option<&str>,
    ) -> Result<Response, String> {
        let (parts, body) = request.into_parts();
        let body = to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| format!("Could not read request body: {}", e))?;

        let mut headers = strip_hop_by_hop(parts.headers);
        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("ID token is not a valid header value; not attaching it"),
            }
        }

        let target = self.target_for(url);
        debug!("Forwarding {} {} -> {}", parts.method, url, target);

        let upstream_response = self
            .client
            .request(parts.method, target.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| format!("Request to {} failed: {}", target, e))?;

        let status = upstream_response.status();
        let headers = strip_hop_by_hop(upstream_response.headers().clone());
        let bytes = upstream_response
            .bytes()
            .await
            .map_err(|e| format!("Reading response from {} failed: {}", target, e))?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers
}
