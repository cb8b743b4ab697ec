//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use core_kernel::{AdapterHealth, HealthCheckResult};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub provider: HealthCheckResult,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (includes the provider adapter)
///
/// Reports 503 while the provider adapter is degraded, e.g. when its circuit
/// breaker is open, so load balancers stop routing partner traffic here.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let provider = state.service.provider().health_check().await;
    let (status, label) = match provider.status {
        AdapterHealth::Healthy => (StatusCode::OK, "ready"),
        AdapterHealth::Degraded => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        AdapterHealth::Unhealthy | AdapterHealth::Unknown => {
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(ReadinessResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            provider,
        }),
    )
}
