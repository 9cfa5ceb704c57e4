use serde::Deserialize;
use std::fmt;

use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_SAFETY_MARGIN_SECS};

/// ================================
/// Client configuration
/// ================================
#[derive(Deserialize, Clone)]
pub struct ClientConfig {
    /// campus host, e.g. `intra.example.com`, or a full base url
    pub endpoint: String,
    pub credential: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub renewal: RenewalConfig,
    pub logging: Option<LoggingConfig>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("credential", &"***")
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("renewal", &self.renewal)
            .field("logging", &self.logging)
            .finish()
    }
}

impl ClientConfig {
    /// Defaults for everything but the endpoint and credential
    pub fn new(endpoint: String, credential: String) -> Self {
        Self {
            endpoint,
            credential,
            request_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            renewal: RenewalConfig::default(),
            logging: Some(LoggingConfig::new("info".to_owned(), LogFormat::from_env())),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenewalConfig {
    /// renew this many seconds before the token expires
    #[serde(default = "default_safety_margin_seconds")]
    pub safety_margin_seconds: u64,
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN_SECS,
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_safety_margin_seconds() -> u64 {
    DEFAULT_SAFETY_MARGIN_SECS
}
