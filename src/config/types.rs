use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::reviews::ReviewsConfig;
use crate::providers::ProviderConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: interceptor, identity provider, summarizer, etc.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub logging: LoggingConfig,
    pub interceptor: InterceptorConfig,
    pub provider: ProviderConfig,
    pub reviews: ReviewsConfig,
    pub summarizer: SummarizerConfig,
}

/// Load config from "config.yaml" in the current directory, with
/// `EATSGATE_*` environment overrides and `GEMINI_API_KEY` on top.
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(Env::prefixed("EATSGATE_").split("__"))
        .merge(
            Env::raw()
                .only(&["GEMINI_API_KEY"])
                .map(|_| "summarizer.api_key".into()),
        );
    match extract_config(figment) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Extracts a `ConfigV1` from any figment, unwrapping the version tag.
pub fn extract_config(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Could not serialize schema: {}", e),
    }
}

/// Settings for the request interceptor.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct InterceptorConfig {
    /// The proxy's own origin, e.g. `http://localhost:8080`.
    pub origin: String,
    /// Where same-origin traffic is forwarded to (the application server).
    pub upstream: String,
    /// Registration URL (or bare query string) carrying `firebaseConfig`.
    pub registration: String,
    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,
    /// Foreign origins that absolute-form requests may be relayed to. Any
    /// other foreign origin is answered with 421 Misdirected Request.
    #[serde(default)]
    pub pass_through_origins: Vec<String>,
    #[serde(default)]
    pub token_retry: TokenRetryConfig,
    /// Unset means the wait endpoint blocks until the identity matches.
    #[serde(default)]
    pub wait_timeout_ms: Option<u64>,
    #[serde(default = "default_forward_timeout_ms")]
    pub forward_timeout_ms: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_asset_prefix() -> String {
    "/_next/".to_string()
}

fn default_forward_timeout_ms() -> u64 {
    30_000
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

/// Bounded retry used when an ID token is not (yet) available.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct TokenRetryConfig {
    /// Total attempts, including the first one.
    pub attempts: u32,
    pub delay_ms: u64,
}

impl Default for TokenRetryConfig {
    fn default() -> Self {
        TokenRetryConfig {
            attempts: 3,
            delay_ms: 250,
        }
    }
}

/// Settings for the Gemini review summary.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SummarizerConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_separator")]
    pub separator: char,
    #[serde(default = "default_summary_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_separator() -> char {
    '@'
}

fn default_summary_timeout_secs() -> u64 {
    60
}
