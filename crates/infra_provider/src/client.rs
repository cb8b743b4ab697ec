//! Insurance Provider Client
//!
//! This module provides the adapter connecting the partner domain to the
//! third-party insurer's REST API. It implements the `InsuranceProvider` port.
//!
//! # Request lifecycle
//!
//! Every operation:
//!
//! 1. resolves a bearer token through the credential cache, authenticating
//!    on a miss
//! 2. sends a JSON request with `Authorization: Bearer <token>`
//! 3. classifies non-2xx responses through the error mapper
//! 4. decodes the body and maps wire names to domain names
//!
//! Every network and cache await runs under the caller's [`CallContext`], so
//! a passed deadline or a cancellation drops the in-flight request.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = InsuranceProviderClient::new(config, transport, cache, authenticator);
//! let quotation = client
//!     .create_quotation(&CallContext::new(), QuotationRequest::new(30, Sex::Female))
//!     .await?;
//! ```

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, CallContext, DomainPort, HealthCheckResult, HealthCheckable, ProviderError,
};
use domain_partner::{
    InsuranceProvider, PolicyRequest, PolicyResult, QuotationRequest, QuotationResult,
};
use infra_cache::CacheStore;

use crate::auth::{ApiKeyAuthenticator, Authenticator};
use crate::config::ProviderConfig;
use crate::error_mapper::{map_decode, map_response, map_transport};
use crate::token::TokenResolver;
use crate::transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport, TransportError};
use crate::wire::{PolicyBody, PolicyResponse, QuotationBody, QuotationResponse};

/// REST adapter for the insurance provider
///
/// Holds only configuration and shared handles; requests and results are
/// owned by the caller. Quote and policy state is never persisted here.
#[derive(Clone)]
pub struct InsuranceProviderClient {
    config: Arc<ProviderConfig>,
    transport: Arc<dyn HttpTransport>,
    tokens: TokenResolver,
}

impl InsuranceProviderClient {
    /// Creates a client from its collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - Provider settings
    /// * `transport` - HTTP transport for operation requests
    /// * `cache` - Credential cache shared across calls
    /// * `authenticator` - Used on a token cache miss
    pub fn new(
        config: Arc<ProviderConfig>,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn CacheStore>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            config,
            transport,
            tokens: TokenResolver::new(cache, authenticator),
        }
    }

    /// Creates a client over reqwest with API-key authentication
    pub fn from_config(
        config: ProviderConfig,
        cache: Arc<dyn CacheStore>,
    ) -> Result<Self, TransportError> {
        let config = Arc::new(config);
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
        let authenticator = Arc::new(ApiKeyAuthenticator::new(config.clone(), transport.clone()));
        Ok(Self::new(config, transport, cache, authenticator))
    }

    /// Replaces the token resolver, e.g. to guard authentication separately
    pub fn with_token_resolver(mut self, tokens: TokenResolver) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn send<B, R>(
        &self,
        ctx: &CallContext,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<R, ProviderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let token = self.tokens.resolve(ctx).await?;

        let mut request = HttpRequest::new(method, self.config.endpoint(path))
            .with_bearer_token(token.as_str())
            .with_header("content-type", "application/json")
            .with_timeout(self.config.request_timeout());
        if let Some(body) = body {
            let encoded = serde_json::to_string(body)
                .map_err(|e| ProviderError::internal(format!("failed to encode request: {e}")))?;
            request = request.with_json_body(encoded);
        }

        debug!(method = method.as_str(), path, "Sending provider request");
        let response = ctx
            .run(self.transport.execute(request))
            .await?
            .map_err(map_transport)?;
        debug!(status = response.status, "Provider responded");

        if let Some(error) = map_response(response.status, &response.body) {
            return Err(error);
        }

        serde_json::from_str(&response.body).map_err(|e| map_decode(response.status, &response.body, e))
    }
}

impl std::fmt::Debug for InsuranceProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsuranceProviderClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Path of a single policy
///
/// The id must be one path segment of unreserved URL characters; anything
/// else is refused before a token is resolved or a request is sent.
fn policy_path(policy_id: &str) -> Result<String, ProviderError> {
    let is_segment = !policy_id.is_empty()
        && policy_id != "."
        && policy_id != ".."
        && policy_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'));
    if !is_segment {
        return Err(ProviderError::BadRequest {
            status: 400,
            message: format!("invalid policy id: {policy_id:?}"),
        });
    }
    Ok(format!("policies/{policy_id}"))
}

fn policy_result(response: PolicyResponse) -> PolicyResult {
    PolicyResult {
        provider_id: response.id,
        quotation_id: response.quotation_id,
        name: response.name,
        sex: response.sex,
        date_of_birth: response.date_of_birth,
    }
}

impl DomainPort for InsuranceProviderClient {}

#[async_trait]
impl HealthCheckable for InsuranceProviderClient {
    /// Reports the configured endpoint without calling it
    async fn health_check(&self) -> HealthCheckResult {
        if self.config.base_url.is_empty() {
            return HealthCheckResult::new("insurance-provider", AdapterHealth::Unhealthy)
                .with_message("provider base URL is not configured");
        }
        HealthCheckResult::new("insurance-provider", AdapterHealth::Healthy)
            .with_message(format!("configured for {}", self.config.base_url))
    }
}

#[async_trait]
impl InsuranceProvider for InsuranceProviderClient {
    #[instrument(skip(self, ctx, request), fields(age = request.age))]
    async fn create_quotation(
        &self,
        ctx: &CallContext,
        request: QuotationRequest,
    ) -> Result<QuotationResult, ProviderError> {
        let body = QuotationBody {
            age: request.age,
            sex: &request.sex,
        };
        let response: QuotationResponse = self
            .send(ctx, HttpMethod::Post, "quotations", Some(&body))
            .await?;

        let price = Decimal::from_str(&response.price.to_string()).map_err(|e| {
            ProviderError::internal(format!("invalid quotation price {}: {e}", response.price))
        })?;
        let expires_at = self
            .config
            .timezone
            .parse_end_of_day(&response.expire_at)
            .map_err(|e| ProviderError::internal(e.to_string()))?;

        Ok(QuotationResult {
            provider_id: response.id,
            age: response.age,
            sex: response.sex,
            price,
            expires_at,
        })
    }

    #[instrument(skip(self, ctx, request), fields(quotation_id = %request.quotation_id))]
    async fn create_policy(
        &self,
        ctx: &CallContext,
        request: PolicyRequest,
    ) -> Result<PolicyResult, ProviderError> {
        let body = PolicyBody {
            quotation_id: request.quotation_id,
            name: &request.name,
            sex: &request.sex,
            date_of_birth: &request.date_of_birth,
        };
        let response: PolicyResponse = self
            .send(ctx, HttpMethod::Post, "policies", Some(&body))
            .await?;
        Ok(policy_result(response))
    }

    #[instrument(skip(self, ctx))]
    async fn get_policy(
        &self,
        ctx: &CallContext,
        policy_id: &str,
    ) -> Result<PolicyResult, ProviderError> {
        let path = policy_path(policy_id)?;
        let response: PolicyResponse = self
            .send::<(), _>(ctx, HttpMethod::Get, &path, None)
            .await?;
        Ok(policy_result(response))
    }
}
