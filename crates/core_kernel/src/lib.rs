//! Core Kernel - Foundational types shared by the partner broker crates
//!
//! This crate provides the fundamental building blocks used across the workspace:
//! - Strongly-typed identifiers for local records
//! - Provider calendar dates normalized to end of day
//! - Per-call deadline and cancellation ([`CallContext`])
//! - The provider error taxonomy and adapter health types
//! - An injectable monotonic clock

pub mod clock;
pub mod context;
pub mod error;
pub mod identifiers;
pub mod ports;
pub mod temporal;

pub use clock::{Clock, MockClock, SystemClock};
pub use context::{CallContext, Interrupted};
pub use error::CoreError;
pub use identifiers::{PartnerId, PolicyId, QuoteId};
pub use ports::{
    AdapterHealth, CircuitBreakerConfig, DomainPort, HealthCheckResult, HealthCheckable,
    ProviderError, ProviderErrorKind,
};
pub use temporal::{Timezone, TemporalError, PROVIDER_DATE_FORMAT};
