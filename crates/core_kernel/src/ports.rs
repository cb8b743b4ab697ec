//! Ports and Adapters Infrastructure
//!
//! This module provides the foundational types shared by port traits and
//! the adapters that implement them.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Partner Service (orchestration)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Port Traits                            │
//! │     (InsuranceProvider, PartnerRepository, ...)             │
//! │   Defined in domain_partner, depend only on core_kernel     │
//! └─────────────────────────────────────────────────────────────┘
//!                    ▲                         ▲
//!                    │                         │
//!         ┌─────────┴─────────┐     ┌────────┴─────────┐
//!         │ In-memory adapter │     │ Provider adapter │
//!         │  (repositories)   │     │ (REST API + CB)  │
//!         └───────────────────┘     └──────────────────┘
//! ```
//!
//! # Error taxonomy
//!
//! [`ProviderError`] is the single error type surfaced by the provider port.
//! Upstream payloads are classified once, by the adapter, into one of the
//! [`ProviderErrorKind`] variants so callers can pick an HTTP status or a
//! retry policy without inspecting strings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::Interrupted;

/// Discriminant of [`ProviderError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    Transport,
    Authentication,
    Cache,
    BadRequest,
    Internal,
    CircuitOpen,
    Cancelled,
    DeadlineExceeded,
}

/// Error type for insurance provider operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Network or connection failure before a response status existed
    #[error("transport error: {message}")]
    Transport {
        message: String,
    },

    /// The auth endpoint was unreachable, refused the key or sent a malformed body
    #[error("authentication with provider failed: {message}")]
    Authentication {
        message: String,
        status: Option<u16>,
    },

    /// The credential cache failed (distinct from a cache miss)
    #[error("credential cache error: {message}")]
    Cache {
        message: String,
    },

    /// The provider rejected the request with a 4xx and a readable message
    ///
    /// Displays as the provider message verbatim.
    #[error("{message}")]
    BadRequest {
        status: u16,
        message: String,
    },

    /// Any other unexpected response; carries the raw body for diagnostics
    #[error("{message}")]
    Internal {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    /// The circuit breaker short-circuited the call
    #[error("circuit breaker '{name}' is open")]
    CircuitOpen {
        name: String,
    },

    /// The caller cancelled the call
    #[error("provider call cancelled")]
    Cancelled,

    /// The call's deadline passed before the provider answered
    #[error("provider call deadline exceeded")]
    DeadlineExceeded,
}

impl ProviderError {
    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        ProviderError::Transport {
            message: message.into(),
        }
    }

    /// Creates an Authentication error without a status
    pub fn authentication(message: impl Into<String>) -> Self {
        ProviderError::Authentication {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a Cache error
    pub fn cache(message: impl Into<String>) -> Self {
        ProviderError::Cache {
            message: message.into(),
        }
    }

    /// Creates an Internal error without status or body
    pub fn internal(message: impl Into<String>) -> Self {
        ProviderError::Internal {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Returns the kind discriminant
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::Transport { .. } => ProviderErrorKind::Transport,
            ProviderError::Authentication { .. } => ProviderErrorKind::Authentication,
            ProviderError::Cache { .. } => ProviderErrorKind::Cache,
            ProviderError::BadRequest { .. } => ProviderErrorKind::BadRequest,
            ProviderError::Internal { .. } => ProviderErrorKind::Internal,
            ProviderError::CircuitOpen { .. } => ProviderErrorKind::CircuitOpen,
            ProviderError::Cancelled => ProviderErrorKind::Cancelled,
            ProviderError::DeadlineExceeded => ProviderErrorKind::DeadlineExceeded,
        }
    }

    /// Human-readable message without the kind prefix
    pub fn message(&self) -> String {
        match self {
            ProviderError::Transport { message }
            | ProviderError::Authentication { message, .. }
            | ProviderError::Cache { message }
            | ProviderError::BadRequest { message, .. }
            | ProviderError::Internal { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Upstream HTTP status, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::BadRequest { status, .. } => Some(*status),
            ProviderError::Authentication { status, .. }
            | ProviderError::Internal { status, .. } => *status,
            _ => None,
        }
    }

    /// Raw upstream body kept for diagnostics
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            ProviderError::Internal { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// True when the provider itself looks unhealthy
    ///
    /// These outcomes count as failures for the circuit breaker. A 4xx with
    /// a readable message means the provider is answering normally.
    pub fn indicates_provider_failure(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport { .. }
                | ProviderError::Authentication { .. }
                | ProviderError::Internal { .. }
                | ProviderError::DeadlineExceeded
        )
    }

    /// True for errors a higher layer may retry as-is
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport { .. }
                | ProviderError::Internal { .. }
                | ProviderError::CircuitOpen { .. }
                | ProviderError::DeadlineExceeded
        )
    }
}

impl From<Interrupted> for ProviderError {
    fn from(interrupted: Interrupted) -> Self {
        match interrupted {
            Interrupted::Cancelled => ProviderError::Cancelled,
            Interrupted::DeadlineExceeded => ProviderError::DeadlineExceeded,
        }
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Circuit breaker configuration for external adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// The circuit opens once consecutive failures exceed this number
    pub failure_threshold: u32,
    /// Seconds the circuit stays open before half-opening
    pub open_timeout_secs: u64,
    /// Seconds after which closed-state counts are cleared; 0 disables
    pub interval_secs: u64,
    /// Probes admitted while half-open; that many successes close the circuit
    pub half_open_max_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout_secs: 30,
            interval_secs: 60,
            half_open_max_requests: 1,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn open_timeout(&self) -> Duration {
        Duration::from_secs(self.open_timeout_secs)
    }

    /// Counting window, `None` when counts never reset while closed
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }
}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    /// Adapter is healthy and operational
    Healthy,
    /// Adapter is degraded but operational
    Degraded,
    /// Adapter is unhealthy and not operational
    Unhealthy,
    /// Health status is unknown
    Unknown,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    pub fn new(adapter_id: impl Into<String>, status: AdapterHealth) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Reports the adapter's current health without calling the upstream
    async fn health_check(&self) -> HealthCheckResult;
}
