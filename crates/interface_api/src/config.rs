//! API configuration
//!
//! Settings are read from `API__`-prefixed environment variables, with `__`
//! separating nested keys (`API__PROVIDER__BASE_URL`). Deployments that still
//! export the legacy names `INSURANCE_PROVIDER_URL`, `INSURANCE_PROVIDER_TOKEN`
//! and `REDIS_URL` keep working: those fill any value left unset.

use std::time::Duration;

use core_kernel::{CircuitBreakerConfig, CoreError};
use infra_provider::ProviderConfig;
use serde::Deserialize;

/// Legacy variable holding the provider base URL
pub const LEGACY_PROVIDER_URL: &str = "INSURANCE_PROVIDER_URL";
/// Legacy variable holding the provider API key
pub const LEGACY_PROVIDER_TOKEN: &str = "INSURANCE_PROVIDER_TOKEN";
/// Legacy variable holding the Redis connection string
pub const LEGACY_REDIS_URL: &str = "REDIS_URL";

/// Longest accepted breaker window or cool-down, in seconds
pub const MAX_BREAKER_WINDOW_SECS: u64 = 7 * 24 * 3600;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Deadline applied to every partner request, in milliseconds
    pub request_timeout_ms: u64,
    /// Insurance provider settings
    pub provider: ProviderConfig,
    /// Breaker guarding provider calls
    pub circuit_breaker: CircuitBreakerConfig,
    /// Redis connection string for the credential cache; in-memory when unset
    pub redis_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            request_timeout_ms: 30_000,
            provider: ProviderConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            redis_url: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let config = Self::from_environment(Self::environment())?;
        Ok(config.with_legacy_fallbacks(|name| std::env::var(name).ok()))
    }

    /// Loads configuration from an explicit environment source
    ///
    /// # Arguments
    ///
    /// * `environment` - An `API`-prefixed source, possibly backed by a fixed map
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// The `API__*` environment source used by [`ApiConfig::from_env`]
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("API")
            .separator("__")
            .try_parsing(true)
    }

    /// Fills unset values from the legacy variable names
    ///
    /// # Arguments
    ///
    /// * `lookup` - Resolves a variable name to its value
    pub fn with_legacy_fallbacks<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.provider.base_url.is_empty() {
            if let Some(url) = lookup(LEGACY_PROVIDER_URL) {
                self.provider.base_url = url;
            }
        }
        if self.provider.api_key.is_empty() {
            if let Some(key) = lookup(LEGACY_PROVIDER_TOKEN) {
                self.provider.api_key = key;
            }
        }
        if self.redis_url.is_none() {
            self.redis_url = lookup(LEGACY_REDIS_URL).filter(|url| !url.is_empty());
        }
        self
    }

    /// Checks that the provider can be reached and authenticated against
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.provider.base_url.trim().is_empty() {
            return Err(CoreError::configuration(format!(
                "provider base URL is not set (API__PROVIDER__BASE_URL or {LEGACY_PROVIDER_URL})"
            )));
        }
        if self.provider.api_key.is_empty() {
            return Err(CoreError::configuration(format!(
                "provider API key is not set (API__PROVIDER__API_KEY or {LEGACY_PROVIDER_TOKEN})"
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(CoreError::configuration("request timeout must be positive"));
        }
        self.validate_circuit_breaker()
    }

    fn validate_circuit_breaker(&self) -> Result<(), CoreError> {
        let breaker = &self.circuit_breaker;
        if breaker.half_open_max_requests == 0 {
            return Err(CoreError::configuration(
                "circuit breaker must admit at least one half-open request",
            ));
        }
        for (name, secs) in [
            ("open_timeout_secs", breaker.open_timeout_secs),
            ("interval_secs", breaker.interval_secs),
        ] {
            if secs > MAX_BREAKER_WINDOW_SECS {
                return Err(CoreError::configuration(format!(
                    "circuit breaker {name} must not exceed {MAX_BREAKER_WINDOW_SECS}"
                )));
            }
        }
        Ok(())
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
