//! Partner application service
//!
//! Orchestrates the repositories and the insurance provider to implement the
//! partner-facing workflows: registering partners, quoting, issuing and
//! retrieving policies.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use core_kernel::{CallContext, PartnerId, PolicyId, QuoteId};

use crate::error::PartnerError;
use crate::partner::Partner;
use crate::policy::{Policy, PolicyApplication};
use crate::ports::{
    InsuranceProvider, PartnerRepository, PolicyRepository, PolicyRequest, QuotationRequest,
    QuoteRepository, RepositoryError,
};
use crate::quote::{Quote, Sex};

/// Service composing partner storage with the insurance provider
#[derive(Clone)]
pub struct PartnerService {
    partners: Arc<dyn PartnerRepository>,
    quotes: Arc<dyn QuoteRepository>,
    policies: Arc<dyn PolicyRepository>,
    provider: Arc<dyn InsuranceProvider>,
}

impl PartnerService {
    /// Creates a new service
    ///
    /// # Arguments
    ///
    /// * `partners` - Partner storage
    /// * `quotes` - Quote storage
    /// * `policies` - Policy storage
    /// * `provider` - Insurance provider adapter, usually breaker-guarded
    pub fn new(
        partners: Arc<dyn PartnerRepository>,
        quotes: Arc<dyn QuoteRepository>,
        policies: Arc<dyn PolicyRepository>,
        provider: Arc<dyn InsuranceProvider>,
    ) -> Self {
        Self {
            partners,
            quotes,
            policies,
            provider,
        }
    }

    /// Returns the provider adapter, for health reporting
    pub fn provider(&self) -> &Arc<dyn InsuranceProvider> {
        &self.provider
    }

    /// Registers a new partner
    ///
    /// # Errors
    ///
    /// `PartnerError::PartnerAlreadyExists` if the CNPJ is already registered.
    #[instrument(skip(self, partner), fields(partner_id = %partner.id))]
    pub async fn create_partner(&self, partner: Partner) -> Result<Partner, PartnerError> {
        if self.partners.find_by_cnpj(&partner.cnpj).await?.is_some() {
            return Err(PartnerError::PartnerAlreadyExists);
        }

        match self.partners.insert(&partner).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration of the same CNPJ
            Err(RepositoryError::Duplicate(_)) => return Err(PartnerError::PartnerAlreadyExists),
            Err(e) => return Err(e.into()),
        }

        info!("Partner registered");
        Ok(partner)
    }

    /// Obtains a quotation from the provider and stores it for the partner
    ///
    /// # Arguments
    ///
    /// * `ctx` - Deadline and cancellation for the provider call
    /// * `partner_id` - Partner requesting the quote
    /// * `age` - Age of the person to insure
    /// * `sex` - Sex of the person to insure
    #[instrument(skip(self, ctx), fields(partner_id = %partner_id))]
    pub async fn create_quote(
        &self,
        ctx: &CallContext,
        partner_id: &PartnerId,
        age: u8,
        sex: Sex,
    ) -> Result<Quote, PartnerError> {
        self.require_partner(partner_id).await?;

        let quotation = self
            .provider
            .create_quotation(ctx, QuotationRequest::new(age, sex))
            .await?;
        debug!(provider_id = %quotation.provider_id, "Quotation received");

        let quote = Quote {
            id: QuoteId::new(),
            provider_id: quotation.provider_id,
            partner_id: *partner_id,
            age: quotation.age,
            sex: Sex::from_str(&quotation.sex).map_err(|e| PartnerError::invalid(e.to_string()))?,
            price: quotation.price,
            expires_at: quotation.expires_at,
            created_at: Utc::now(),
        };
        self.quotes.insert(&quote).await?;

        Ok(quote)
    }

    /// Issues a policy through the provider and records it for the partner
    #[instrument(skip(self, ctx, application), fields(partner_id = %partner_id))]
    pub async fn create_policy(
        &self,
        ctx: &CallContext,
        partner_id: &PartnerId,
        application: PolicyApplication,
    ) -> Result<Policy, PartnerError> {
        self.require_partner(partner_id).await?;

        let issued = self
            .provider
            .create_policy(
                ctx,
                PolicyRequest {
                    quotation_id: application.quotation_id,
                    name: application.name,
                    sex: application.sex.as_str().to_string(),
                    date_of_birth: application.date_of_birth,
                },
            )
            .await?;

        let policy = Policy {
            id: PolicyId::new(),
            partner_id: *partner_id,
            provider_id: issued.provider_id,
            quotation_id: issued.quotation_id,
            name: issued.name,
            sex: issued.sex,
            date_of_birth: issued.date_of_birth,
            created_at: Utc::now(),
        };
        self.policies.insert(&policy).await?;

        info!(policy_id = %policy.id, "Policy issued");
        Ok(policy)
    }

    /// Retrieves a partner's policy with the provider's current data
    ///
    /// # Errors
    ///
    /// `PartnerError::PolicyNotFound` if the policy does not exist or belongs
    /// to another partner; the provider is not called in that case.
    #[instrument(skip(self, ctx), fields(partner_id = %partner_id, policy_id = %policy_id))]
    pub async fn get_policy(
        &self,
        ctx: &CallContext,
        partner_id: &PartnerId,
        policy_id: &PolicyId,
    ) -> Result<Policy, PartnerError> {
        self.require_partner(partner_id).await?;

        let stored = self
            .policies
            .find_by_id_and_partner(policy_id, partner_id)
            .await?
            .ok_or(PartnerError::PolicyNotFound)?;

        let current = self
            .provider
            .get_policy(ctx, &stored.provider_id.to_string())
            .await?;

        Ok(Policy {
            quotation_id: current.quotation_id,
            name: current.name,
            sex: current.sex,
            date_of_birth: current.date_of_birth,
            ..stored
        })
    }

    async fn require_partner(&self, partner_id: &PartnerId) -> Result<Partner, PartnerError> {
        self.partners
            .find_by_id(partner_id)
            .await?
            .ok_or(PartnerError::PartnerNotFound)
    }
}

impl std::fmt::Debug for PartnerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerService").finish_non_exhaustive()
    }
}
