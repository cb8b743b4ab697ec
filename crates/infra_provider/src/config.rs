//! Provider adapter configuration

use std::fmt;
use std::time::Duration;

use core_kernel::Timezone;
use serde::{Deserialize, Serialize};

/// Connection settings for the insurance provider API
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the provider API (e.g., "https://insurer.example.com/api")
    pub base_url: String,

    /// Static API key exchanged for a bearer token
    pub api_key: String,

    /// Header carrying the API key on the auth request
    pub api_key_header: String,

    /// Per-request transport timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Timezone in which provider calendar dates are interpreted
    pub timezone: Timezone,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            api_key_header: "x-api-key".to_string(),
            request_timeout_ms: 10_000,
            timezone: Timezone::default(),
        }
    }
}

impl ProviderConfig {
    /// Creates a configuration with default header, timeout and timezone
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Builds the absolute URL of a provider-relative path
    ///
    /// # Arguments
    ///
    /// * `path` - Path relative to the base URL, with or without a leading slash
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("api_key_header", &self.api_key_header)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("timezone", &self.timezone.name())
            .finish()
    }
}
