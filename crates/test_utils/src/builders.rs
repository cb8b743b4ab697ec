//! Test Data Builders
//!
//! [`ProviderHarness`] wires a real [`InsuranceProviderClient`] (reqwest
//! transport, API-key authenticator) to a wiremock server standing in for
//! the insurer.

use std::sync::Arc;

use core_kernel::{CallContext, Timezone};
use infra_cache::{CacheStore, InMemoryCacheStore};
use infra_provider::{InsuranceProviderClient, ProviderConfig, TOKEN_CACHE_KEY, TOKEN_TTL};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::fixtures::{WireFixtures, TEST_ACCESS_TOKEN, TEST_API_KEY};

/// Builder for [`ProviderHarness`]
pub struct ProviderHarnessBuilder {
    cache: Option<Arc<dyn CacheStore>>,
    timezone: Timezone,
    request_timeout_ms: u64,
}

impl Default for ProviderHarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderHarnessBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            cache: None,
            timezone: Timezone::default(),
            request_timeout_ms: 5_000,
        }
    }

    /// Uses the given cache instead of a fresh in-memory one
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the provider timezone
    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Sets the per-request transport timeout
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Starts the mock server and builds the client
    pub async fn start(self) -> ProviderHarness {
        let server = MockServer::start().await;
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(InMemoryCacheStore::new()));

        let config = ProviderConfig {
            timezone: self.timezone,
            request_timeout_ms: self.request_timeout_ms,
            ..ProviderConfig::new(server.uri(), TEST_API_KEY)
        };
        let client = InsuranceProviderClient::from_config(config, cache.clone())
            .unwrap_or_else(|e| panic!("failed to build provider client: {e}"));

        ProviderHarness {
            server,
            client,
            cache,
        }
    }
}

/// A provider client talking to a local mock insurer
pub struct ProviderHarness {
    pub server: MockServer,
    pub client: InsuranceProviderClient,
    pub cache: Arc<dyn CacheStore>,
}

impl ProviderHarness {
    /// Starts a harness with default settings
    pub async fn start() -> Self {
        ProviderHarnessBuilder::new().start().await
    }

    pub fn builder() -> ProviderHarnessBuilder {
        ProviderHarnessBuilder::new()
    }

    /// Mounts `POST /auth` answering `token` when the API key header matches
    ///
    /// # Arguments
    ///
    /// * `token` - Access token to hand out
    /// * `expected_calls` - Exact number of auth requests the test expects
    pub async fn mount_auth(&self, token: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/auth"))
            .and(header("x-api-key", TEST_API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(WireFixtures::auth(token)))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Stores the default test token so calls skip authentication
    pub async fn seed_token(&self) {
        self.cache
            .set(TOKEN_CACHE_KEY, TEST_ACCESS_TOKEN, TOKEN_TTL)
            .await
            .unwrap_or_else(|e| panic!("failed to seed token: {e}"));
    }

    /// A context with a generous deadline, so a hung test fails instead of hanging
    pub fn ctx(&self) -> CallContext {
        CallContext::new().with_timeout(std::time::Duration::from_secs(10))
    }
}
