//! Insurance Provider Infrastructure
//!
//! This crate implements the resilient access layer to the third-party
//! insurance provider:
//!
//! - [`InsuranceProviderClient`] - authenticated REST adapter implementing the
//!   `InsuranceProvider` port
//! - [`TokenResolver`] - bearer token reuse through the credential cache
//! - [`ApiKeyAuthenticator`] - API-key to bearer-token exchange
//! - [`error_mapper`] - classification of upstream responses
//! - [`CircuitBreaker`] with the [`BreakerGuardedProvider`] and
//!   [`BreakerGuardedAuthenticator`] decorators
//!
//! # Wiring
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_cache::InMemoryCacheStore;
//! use infra_provider::{BreakerGuardedProvider, CircuitBreaker, InsuranceProviderClient, ProviderConfig};
//!
//! let client = InsuranceProviderClient::from_config(
//!     ProviderConfig::new("https://insurer.example.com", api_key),
//!     Arc::new(InMemoryCacheStore::new()),
//! )?;
//! let breaker = Arc::new(CircuitBreaker::new("insurance-provider", Default::default()));
//! let provider = BreakerGuardedProvider::new(client, breaker);
//! ```

pub mod auth;
pub mod circuit_breaker;
pub mod client;
pub mod config;
pub mod error_mapper;
pub mod guarded;
pub mod token;
pub mod transport;
mod wire;

pub use auth::{AccessToken, ApiKeyAuthenticator, Authenticator, Credential};
pub use circuit_breaker::{Admission, CircuitBreaker, CircuitState, Counts, Outcome};
pub use client::InsuranceProviderClient;
pub use config::ProviderConfig;
pub use guarded::{BreakerGuardedAuthenticator, BreakerGuardedProvider, GuardedOperations};
pub use token::{TokenResolver, TOKEN_CACHE_KEY, TOKEN_TTL};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};
