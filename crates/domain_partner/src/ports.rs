//! Partner Domain Ports
//!
//! This module defines the port interfaces the partner domain needs from the
//! outside world:
//!
//! - [`InsuranceProvider`] - the third-party insurer's API (quote, issue, fetch)
//! - [`PartnerRepository`], [`QuoteRepository`], [`PolicyRepository`] - storage
//!
//! # Architecture
//!
//! Application services receive the port traits as `Arc<dyn ...>` so the
//! adapter can be swapped at startup:
//!
//! ```rust,ignore
//! let provider: Arc<dyn InsuranceProvider> = Arc::new(
//!     BreakerGuardedProvider::new(InsuranceProviderClient::new(...), breaker),
//! );
//! let service = PartnerService::new(partners, quotes, policies, provider);
//! ```
//!
//! Every provider operation takes a [`CallContext`] so callers can bound it
//! with a deadline or cancel it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use core_kernel::{
    CallContext, DomainPort, HealthCheckable, PartnerId, PolicyId, ProviderError, QuoteId,
};

use crate::partner::Partner;
use crate::policy::Policy;
use crate::quote::{Quote, Sex};

/// Quotation request sent to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotationRequest {
    /// Age of the person to insure (0-99)
    pub age: u8,
    /// Sex code, sent to the provider exactly as stored here
    pub sex: String,
}

impl QuotationRequest {
    /// Builds a request with the provider's upper-case sex code
    pub fn new(age: u8, sex: Sex) -> Self {
        Self {
            age,
            sex: sex.as_str().to_string(),
        }
    }
}

/// Priced quotation returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotationResult {
    /// Quotation identifier issued by the provider
    pub provider_id: Uuid,
    pub age: u8,
    pub sex: String,
    pub price: Decimal,
    /// End of the provider's expiry date, 23:59:59 in the provider timezone
    pub expires_at: DateTime<Utc>,
}

/// Policy issuance request sent to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRequest {
    pub quotation_id: Uuid,
    pub name: String,
    pub sex: String,
    pub date_of_birth: String,
}

/// Policy as known by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyResult {
    /// Policy identifier issued by the provider
    pub provider_id: Uuid,
    pub quotation_id: Uuid,
    pub name: String,
    pub sex: String,
    pub date_of_birth: String,
}

/// Port for the third-party insurance provider
///
/// Implementations attach credentials, translate wire formats and classify
/// upstream failures into [`ProviderError`]. They never persist quote or
/// policy state.
#[async_trait]
pub trait InsuranceProvider: DomainPort + HealthCheckable {
    /// Requests a priced quotation
    ///
    /// # Arguments
    ///
    /// * `ctx` - Deadline and cancellation for the call
    /// * `request` - Age and sex of the person to insure
    ///
    /// # Returns
    ///
    /// The provider's quotation, or a classified `ProviderError`
    async fn create_quotation(
        &self,
        ctx: &CallContext,
        request: QuotationRequest,
    ) -> Result<QuotationResult, ProviderError>;

    /// Issues a policy from a previously obtained quotation
    ///
    /// # Arguments
    ///
    /// * `ctx` - Deadline and cancellation for the call
    /// * `request` - Quotation id and the insured person's details
    async fn create_policy(
        &self,
        ctx: &CallContext,
        request: PolicyRequest,
    ) -> Result<PolicyResult, ProviderError>;

    /// Fetches a policy by its provider identifier
    ///
    /// # Arguments
    ///
    /// * `ctx` - Deadline and cancellation for the call
    /// * `policy_id` - Identifier issued by the provider
    async fn get_policy(
        &self,
        ctx: &CallContext,
        policy_id: &str,
    ) -> Result<PolicyResult, ProviderError>;
}

/// Errors surfaced by repository adapters
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// A uniqueness rule was violated
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// The storage backend failed
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Storage port for partners
#[async_trait]
pub trait PartnerRepository: DomainPort {
    /// Retrieves a partner by ID, `None` when absent
    async fn find_by_id(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError>;

    /// Retrieves a partner by CNPJ, `None` when absent
    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Partner>, RepositoryError>;

    /// Stores a new partner
    ///
    /// Returns `RepositoryError::Duplicate` when the CNPJ is already taken.
    async fn insert(&self, partner: &Partner) -> Result<(), RepositoryError>;
}

/// Storage port for quotes
#[async_trait]
pub trait QuoteRepository: DomainPort {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError>;

    async fn insert(&self, quote: &Quote) -> Result<(), RepositoryError>;
}

/// Storage port for policies
#[async_trait]
pub trait PolicyRepository: DomainPort {
    /// Retrieves a policy only if it belongs to the given partner
    async fn find_by_id_and_partner(
        &self,
        id: &PolicyId,
        partner_id: &PartnerId,
    ) -> Result<Option<Policy>, RepositoryError>;

    async fn insert(&self, policy: &Policy) -> Result<(), RepositoryError>;
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use tokio::sync::{Mutex, RwLock};

    /// A call received by [`MockInsuranceProvider`]
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProviderCall {
        CreateQuotation(QuotationRequest),
        CreatePolicy(PolicyRequest),
        GetPolicy(String),
    }

    /// In-memory stand-in for the insurance provider
    ///
    /// Queued failures are returned first, one per call. Otherwise quotations
    /// are answered from the queue of scripted results, falling back to an
    /// echo of the request priced at 100.00; issued policies are kept so
    /// `get_policy` can find them again.
    #[derive(Debug, Default)]
    pub struct MockInsuranceProvider {
        failures: Mutex<VecDeque<ProviderError>>,
        quotations: Mutex<VecDeque<QuotationResult>>,
        policies: RwLock<HashMap<Uuid, PolicyResult>>,
        calls: RwLock<Vec<ProviderCall>>,
    }

    impl MockInsuranceProvider {
        /// Creates a new mock provider
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a quotation to return from the next `create_quotation`
        pub async fn push_quotation(&self, quotation: QuotationResult) {
            self.quotations.lock().await.push_back(quotation);
        }

        /// Queues an error for the next call, whatever the operation
        pub async fn push_failure(&self, error: ProviderError) {
            self.failures.lock().await.push_back(error);
        }

        /// Registers a policy the provider already knows about
        pub async fn insert_policy(&self, policy: PolicyResult) {
            self.policies.write().await.insert(policy.provider_id, policy);
        }

        /// Calls received so far, in order
        pub async fn calls(&self) -> Vec<ProviderCall> {
            self.calls.read().await.clone()
        }

        async fn record(&self, call: ProviderCall) -> Result<(), ProviderError> {
            self.calls.write().await.push(call);
            match self.failures.lock().await.pop_front() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    impl DomainPort for MockInsuranceProvider {}

    #[async_trait]
    impl HealthCheckable for MockInsuranceProvider {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::new("mock-insurance-provider", AdapterHealth::Healthy)
                .with_message("Mock adapter always healthy")
        }
    }

    #[async_trait]
    impl InsuranceProvider for MockInsuranceProvider {
        async fn create_quotation(
            &self,
            ctx: &CallContext,
            request: QuotationRequest,
        ) -> Result<QuotationResult, ProviderError> {
            ctx.check()?;
            self.record(ProviderCall::CreateQuotation(request.clone())).await?;

            if let Some(quotation) = self.quotations.lock().await.pop_front() {
                return Ok(quotation);
            }
            Ok(QuotationResult {
                provider_id: Uuid::new_v4(),
                age: request.age,
                sex: request.sex,
                price: Decimal::new(10_000, 2),
                expires_at: Utc::now() + chrono::Duration::days(30),
            })
        }

        async fn create_policy(
            &self,
            ctx: &CallContext,
            request: PolicyRequest,
        ) -> Result<PolicyResult, ProviderError> {
            ctx.check()?;
            self.record(ProviderCall::CreatePolicy(request.clone())).await?;

            let policy = PolicyResult {
                provider_id: Uuid::new_v4(),
                quotation_id: request.quotation_id,
                name: request.name,
                sex: request.sex,
                date_of_birth: request.date_of_birth,
            };
            self.insert_policy(policy.clone()).await;
            Ok(policy)
        }

        async fn get_policy(
            &self,
            ctx: &CallContext,
            policy_id: &str,
        ) -> Result<PolicyResult, ProviderError> {
            ctx.check()?;
            self.record(ProviderCall::GetPolicy(policy_id.to_string())).await?;

            let policies = self.policies.read().await;
            Uuid::parse_str(policy_id)
                .ok()
                .and_then(|id| policies.get(&id).cloned())
                .ok_or_else(|| ProviderError::BadRequest {
                    status: 404,
                    message: "policy not found".to_string(),
                })
        }
    }
}
