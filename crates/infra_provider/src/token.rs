//! Bearer token resolution through the credential cache

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use core_kernel::{CallContext, ProviderError};
use infra_cache::{CacheError, CacheStore};

use crate::auth::{AccessToken, Authenticator};

/// Cache key under which the provider token is stored
pub const TOKEN_CACHE_KEY: &str = "insurance-provider-jwt-token";

/// Lifetime of a cached token
pub const TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

fn cache_failure(error: CacheError) -> ProviderError {
    ProviderError::cache(error.to_string())
}

/// Returns a usable token, authenticating only when the cache has none
///
/// Concurrent callers that miss at the same time each authenticate; the last
/// write wins.
#[derive(Clone)]
pub struct TokenResolver {
    cache: Arc<dyn CacheStore>,
    authenticator: Arc<dyn Authenticator>,
    ttl: Duration,
}

impl TokenResolver {
    pub fn new(cache: Arc<dyn CacheStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            cache,
            authenticator,
            ttl: TOKEN_TTL,
        }
    }

    /// Overrides the cache lifetime of fresh tokens
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Resolves a token for one provider call
    ///
    /// # Errors
    ///
    /// - `ProviderError::Cache` if the cache read fails (other than a miss) or
    ///   the fresh token cannot be written back
    /// - whatever the authenticator returns on a miss
    #[instrument(skip(self, ctx))]
    pub async fn resolve(&self, ctx: &CallContext) -> Result<AccessToken, ProviderError> {
        let cached = match ctx.run(self.cache.get(TOKEN_CACHE_KEY)).await? {
            Ok(value) => value,
            Err(e) if e.is_miss() => None,
            Err(e) => return Err(cache_failure(e)),
        };

        if let Some(token) = cached.filter(|token| !token.is_empty()) {
            debug!("Token cache hit");
            return Ok(AccessToken::new(token));
        }

        debug!("Token cache miss, authenticating");
        let credential = self.authenticator.authenticate(ctx).await?;

        ctx.run(self.cache.set(TOKEN_CACHE_KEY, credential.token.as_str(), self.ttl))
            .await?
            .map_err(cache_failure)?;

        Ok(credential.token)
    }
}

impl std::fmt::Debug for TokenResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResolver")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
