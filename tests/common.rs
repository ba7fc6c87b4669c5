#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use eatsgate::config::{extract_config, ConfigV1};
use eatsgate::routes::create_router;
use eatsgate::startup::build_state;
use eatsgate::state::AppState;
use figment::{
    providers::{Format, Yaml},
    Figment,
};

/// `{"apiKey":"test-api-key","projectId":"friendly-eats"}`, URL-encoded.
pub const FIREBASE_CONFIG_QUERY: &str =
    "firebaseConfig=%7B%22apiKey%22%3A%22test-api-key%22%2C%22projectId%22%3A%22friendly-eats%22%7D";

pub const ORIGIN: &str = "http://localhost:8080";

/// A config with a plain provider: `alice` has a token, `bob` never does.
pub fn test_config(upstream: &str, extra: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
logging:
  level: debug
  format: console
interceptor:
  origin: {origin}
  upstream: {upstream}
  registration: "/auth-service-worker.js?{query}"
  token_retry:
    attempts: 3
    delay_ms: 10
provider:
  type: plain
  name: test users
  users:
    - uid: alice
      secret: alice-refresh
      id_token: alice-id-token
      display_name: Alice
    - uid: bob
      secret: bob-refresh
reviews:
  enabled: false
summarizer:
  api_key: test-gemini-key
"#,
        origin = ORIGIN,
        upstream = upstream,
        query = FIREBASE_CONFIG_QUERY,
    );

    let mut figment = Figment::new().merge(Yaml::string(&yaml));
    if !extra.trim().is_empty() {
        figment = figment.merge(Yaml::string(extra));
    }
    extract_config(figment).expect("test config should parse")
}

pub fn build_app(config: ConfigV1) -> (Router, AppState) {
    let state = build_state(&config).expect("state should build");
    (create_router(state.clone()), state)
}

pub fn request(method: Method, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn request_with_bearer(method: Method, path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn json_request(method: Method, path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}
