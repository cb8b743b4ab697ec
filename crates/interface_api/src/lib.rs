//! HTTP API Layer
//!
//! This crate provides the partner-facing REST API of the broker using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for partners, quotes and policies
//! - **Extractors**: Validated JSON bodies and the per-request call context
//! - **Middleware**: Request ids, access logging, tracing
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent `{error, message}` responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(service, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use domain_partner::PartnerService;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::extract::REQUEST_ID_HEADER;
use crate::handlers::{health, partners};
use crate::middleware::access_log_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PartnerService>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(service: Arc<PartnerService>, config: ApiConfig) -> Self {
        Self { service, config }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Partner service and API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Partner routes
    let partner_routes = Router::new()
        .route("/partners", post(partners::create_partner))
        .route("/partners/:partner_id/quotes", post(partners::create_quote))
        .route("/partners/:partner_id/policies", post(partners::create_policy))
        .route(
            "/partners/:partner_id/policies/:policy_id",
            get(partners::get_policy),
        )
        .layer(axum_middleware::from_fn(access_log_middleware));

    // Combine all routes; the request id is set before anything logs
    Router::new()
        .merge(public_routes)
        .merge(partner_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
