//! Credential acquisition
//!
//! The provider issues short-lived bearer tokens in exchange for a static
//! API key sent to `POST {base}/auth`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use core_kernel::{CallContext, ProviderError};

use crate::config::ProviderConfig;
use crate::transport::{HttpMethod, HttpRequest, HttpTransport};
use crate::wire::AuthResponse;

/// Bearer token issued by the provider
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// A freshly obtained token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: AccessToken,
    pub obtained_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: AccessToken) -> Self {
        Self {
            token,
            obtained_at: Utc::now(),
        }
    }
}

/// Exchanges long-lived secrets for a bearer credential
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    async fn authenticate(&self, ctx: &CallContext) -> Result<Credential, ProviderError>;
}

/// Authenticator sending the static API key in a header
pub struct ApiKeyAuthenticator {
    config: Arc<ProviderConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl ApiKeyAuthenticator {
    /// Creates a new authenticator
    ///
    /// # Arguments
    ///
    /// * `config` - Provider settings (base URL, API key, key header)
    /// * `transport` - HTTP transport used for the auth request
    pub fn new(config: Arc<ProviderConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }
}

impl fmt::Debug for ApiKeyAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuthenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn auth_failure(status: Option<u16>, message: impl Into<String>) -> ProviderError {
    ProviderError::Authentication {
        message: message.into(),
        status,
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    #[instrument(skip(self, ctx))]
    async fn authenticate(&self, ctx: &CallContext) -> Result<Credential, ProviderError> {
        let request = HttpRequest::new(HttpMethod::Post, self.config.endpoint("auth"))
            .with_header(self.config.api_key_header.as_str(), self.config.api_key.as_str())
            .with_timeout(self.config.request_timeout());

        let response = ctx
            .run(self.transport.execute(request))
            .await?
            .map_err(|e| auth_failure(None, e.to_string()))?;

        if !response.is_success() {
            return Err(auth_failure(
                Some(response.status),
                format!("auth endpoint returned status {}", response.status),
            ));
        }

        let decoded: AuthResponse = serde_json::from_str(&response.body).map_err(|e| {
            auth_failure(Some(response.status), format!("malformed auth response: {e}"))
        })?;

        if decoded.access_token.is_empty() {
            return Err(auth_failure(
                Some(response.status),
                "auth response carried an empty access token",
            ));
        }

        debug!("Obtained provider access token");
        Ok(Credential::new(AccessToken::new(decoded.access_token)))
    }
}
