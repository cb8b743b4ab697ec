//! Circuit-breaker decorators
//!
//! The breaker wraps ports rather than living inside the client, so which
//! calls it protects is decided when the application is wired:
//!
//! ```rust,ignore
//! let breaker = Arc::new(CircuitBreaker::new("insurance-provider", config));
//! let provider = BreakerGuardedProvider::new(client, breaker.clone())
//!     .with_operations(GuardedOperations { get_policy: false, ..GuardedOperations::all() });
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use core_kernel::{
    AdapterHealth, CallContext, DomainPort, HealthCheckResult, HealthCheckable, ProviderError,
};
use domain_partner::{
    InsuranceProvider, PolicyRequest, PolicyResult, QuotationRequest, QuotationResult,
};

use crate::auth::{Authenticator, Credential};
use crate::circuit_breaker::{CircuitBreaker, CircuitState};

/// Which provider operations pass through the breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardedOperations {
    pub create_quotation: bool,
    pub create_policy: bool,
    pub get_policy: bool,
}

impl GuardedOperations {
    pub const fn all() -> Self {
        Self {
            create_quotation: true,
            create_policy: true,
            get_policy: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            create_quotation: false,
            create_policy: false,
            get_policy: false,
        }
    }
}

impl Default for GuardedOperations {
    fn default() -> Self {
        Self::all()
    }
}

/// Provider port decorated with a circuit breaker
#[derive(Debug)]
pub struct BreakerGuardedProvider<P> {
    inner: P,
    breaker: Arc<CircuitBreaker>,
    operations: GuardedOperations,
}

impl<P> BreakerGuardedProvider<P> {
    /// Guards every operation of `inner` with `breaker`
    pub fn new(inner: P, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            inner,
            breaker,
            operations: GuardedOperations::all(),
        }
    }

    /// Restricts the breaker to a subset of operations
    pub fn with_operations(mut self, operations: GuardedOperations) -> Self {
        self.operations = operations;
        self
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: InsuranceProvider> DomainPort for BreakerGuardedProvider<P> {}

#[async_trait]
impl<P: InsuranceProvider> HealthCheckable for BreakerGuardedProvider<P> {
    /// Degrades the inner adapter's health while the circuit is not closed
    async fn health_check(&self) -> HealthCheckResult {
        let inner = self.inner.health_check().await;
        match self.breaker.state() {
            CircuitState::Closed => inner,
            state => HealthCheckResult::new(inner.adapter_id, AdapterHealth::Degraded)
                .with_message(format!("circuit breaker '{}' is {state}", self.breaker.name())),
        }
    }
}

#[async_trait]
impl<P: InsuranceProvider> InsuranceProvider for BreakerGuardedProvider<P> {
    async fn create_quotation(
        &self,
        ctx: &CallContext,
        request: QuotationRequest,
    ) -> Result<QuotationResult, ProviderError> {
        let call = self.inner.create_quotation(ctx, request);
        if self.operations.create_quotation {
            self.breaker.call(call).await
        } else {
            call.await
        }
    }

    async fn create_policy(
        &self,
        ctx: &CallContext,
        request: PolicyRequest,
    ) -> Result<PolicyResult, ProviderError> {
        let call = self.inner.create_policy(ctx, request);
        if self.operations.create_policy {
            self.breaker.call(call).await
        } else {
            call.await
        }
    }

    async fn get_policy(
        &self,
        ctx: &CallContext,
        policy_id: &str,
    ) -> Result<PolicyResult, ProviderError> {
        let call = self.inner.get_policy(ctx, policy_id);
        if self.operations.get_policy {
            self.breaker.call(call).await
        } else {
            call.await
        }
    }
}

/// Authenticator decorated with a circuit breaker
#[derive(Debug)]
pub struct BreakerGuardedAuthenticator<A> {
    inner: A,
    breaker: Arc<CircuitBreaker>,
}

impl<A> BreakerGuardedAuthenticator<A> {
    pub fn new(inner: A, breaker: Arc<CircuitBreaker>) -> Self {
        Self { inner, breaker }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

#[async_trait]
impl<A: Authenticator> Authenticator for BreakerGuardedAuthenticator<A> {
    async fn authenticate(&self, ctx: &CallContext) -> Result<Credential, ProviderError> {
        self.breaker.call(self.inner.authenticate(ctx)).await
    }
}
