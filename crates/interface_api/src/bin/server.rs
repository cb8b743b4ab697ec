//! Partner Broker - API Server Binary
//!
//! This binary starts the partner-facing HTTP API, backed by the insurance
//! provider's REST API.
//!
//! # Usage
//!
//! ```bash
//! # Run with the legacy variable names
//! INSURANCE_PROVIDER_URL=https://insurer.example.com INSURANCE_PROVIDER_TOKEN=... cargo run --bin partner-api
//!
//! # Run with structured variables
//! API__PORT=8080 API__PROVIDER__BASE_URL=https://insurer.example.com API__PROVIDER__API_KEY=... cargo run --bin partner-api
//! ```
//!
//! # Environment Variables
//!
//! * `API__HOST` - Server host (default: 0.0.0.0)
//! * `API__PORT` - Server port (default: 8080)
//! * `API__LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API__REQUEST_TIMEOUT_MS` - Deadline for each partner request (default: 30000)
//! * `API__PROVIDER__BASE_URL` / `INSURANCE_PROVIDER_URL` - Provider base URL
//! * `API__PROVIDER__API_KEY` / `INSURANCE_PROVIDER_TOKEN` - Provider API key
//! * `API__PROVIDER__TIMEZONE` - Timezone of provider dates (default: UTC)
//! * `API__CIRCUIT_BREAKER__*` - Breaker thresholds and timeouts
//! * `API__REDIS_URL` / `REDIS_URL` - Redis for the credential cache (default: in-memory)

use std::net::SocketAddr;
use std::sync::Arc;

use core_kernel::CircuitBreakerConfig;
use domain_partner::{
    InMemoryPartnerRepository, InMemoryPolicyRepository, InMemoryQuoteRepository,
    InsuranceProvider, PartnerService,
};
use infra_cache::{CacheStore, InMemoryCacheStore};
use infra_provider::{BreakerGuardedProvider, CircuitBreaker, InsuranceProviderClient};
use interface_api::{config::ApiConfig, create_router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, wires the provider adapter and
/// starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded or is incomplete
/// - The credential cache or HTTP client cannot be created
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;

    init_tracing(&config.log_level);

    config.validate()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        provider = %config.provider.base_url,
        "Starting Partner Broker API Server"
    );

    let cache = create_cache_store(config.redis_url.as_deref()).await?;
    let provider = create_provider(&config, cache)?;

    let service = PartnerService::new(
        Arc::new(InMemoryPartnerRepository::new()),
        Arc::new(InMemoryQuoteRepository::new()),
        Arc::new(InMemoryPolicyRepository::new()),
        provider,
    );

    let app = create_router(AppState::new(Arc::new(service), config.clone()));

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Creates the credential cache.
///
/// # Arguments
///
/// * `redis_url` - Redis connection string; in-memory cache when `None`
///
/// # Errors
///
/// Returns error if Redis is configured but unreachable
#[cfg(feature = "redis")]
async fn create_cache_store(
    redis_url: Option<&str>,
) -> Result<Arc<dyn CacheStore>, infra_cache::CacheError> {
    match redis_url {
        Some(url) => {
            tracing::info!("Connecting to Redis credential cache...");
            let store = infra_cache::RedisCacheStore::connect(url).await?;
            tracing::info!("Redis connection established");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("Using in-memory credential cache");
            Ok(Arc::new(InMemoryCacheStore::new()))
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn create_cache_store(
    redis_url: Option<&str>,
) -> Result<Arc<dyn CacheStore>, infra_cache::CacheError> {
    if redis_url.is_some() {
        tracing::warn!("Redis URL set but the redis feature is disabled; using in-memory cache");
    }
    Ok(Arc::new(InMemoryCacheStore::new()))
}

/// Builds the provider client behind its circuit breaker.
///
/// # Errors
///
/// Returns error if the HTTP client cannot be created
fn create_provider(
    config: &ApiConfig,
    cache: Arc<dyn CacheStore>,
) -> Result<Arc<dyn InsuranceProvider>, infra_provider::TransportError> {
    let client = InsuranceProviderClient::from_config(config.provider.clone(), cache)?;
    let breaker = Arc::new(CircuitBreaker::new(
        "insurance-provider",
        breaker_config(config),
    ));
    Ok(Arc::new(BreakerGuardedProvider::new(client, breaker)))
}

fn breaker_config(config: &ApiConfig) -> CircuitBreakerConfig {
    let breaker = config.circuit_breaker.clone();
    tracing::debug!(
        failure_threshold = breaker.failure_threshold,
        open_timeout_secs = breaker.open_timeout_secs,
        interval_secs = breaker.interval_secs,
        "Circuit breaker configured"
    );
    breaker
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
