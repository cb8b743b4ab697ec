//! In-memory repository adapters
//!
//! These keep records in process memory behind `tokio::sync::RwLock`. They
//! honour the same contracts as a durable store would (CNPJ uniqueness,
//! partner-scoped policy lookup) so the service behaves identically.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, PartnerId, PolicyId, QuoteId};

use crate::partner::Partner;
use crate::policy::Policy;
use crate::ports::{PartnerRepository, PolicyRepository, QuoteRepository, RepositoryError};
use crate::quote::Quote;

/// In-memory partner storage
#[derive(Debug, Default, Clone)]
pub struct InMemoryPartnerRepository {
    partners: Arc<RwLock<HashMap<PartnerId, Partner>>>,
}

impl InMemoryPartnerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored partners
    pub async fn count(&self) -> usize {
        self.partners.read().await.len()
    }
}

impl DomainPort for InMemoryPartnerRepository {}

#[async_trait]
impl PartnerRepository for InMemoryPartnerRepository {
    async fn find_by_id(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError> {
        Ok(self.partners.read().await.get(id).cloned())
    }

    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Partner>, RepositoryError> {
        Ok(self
            .partners
            .read()
            .await
            .values()
            .find(|partner| partner.cnpj == cnpj)
            .cloned())
    }

    #[instrument(skip(self, partner), fields(partner_id = %partner.id))]
    async fn insert(&self, partner: &Partner) -> Result<(), RepositoryError> {
        let mut partners = self.partners.write().await;
        if partners.values().any(|existing| existing.cnpj == partner.cnpj) {
            return Err(RepositoryError::Duplicate(format!(
                "partner with cnpj '{}' already exists",
                partner.cnpj
            )));
        }
        partners.insert(partner.id, partner.clone());
        debug!("Stored partner");
        Ok(())
    }
}

/// In-memory quote storage
#[derive(Debug, Default, Clone)]
pub struct InMemoryQuoteRepository {
    quotes: Arc<RwLock<HashMap<QuoteId, Quote>>>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.quotes.read().await.len()
    }
}

impl DomainPort for InMemoryQuoteRepository {}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError> {
        Ok(self.quotes.read().await.get(id).cloned())
    }

    #[instrument(skip(self, quote), fields(quote_id = %quote.id))]
    async fn insert(&self, quote: &Quote) -> Result<(), RepositoryError> {
        let mut quotes = self.quotes.write().await;
        if quotes.contains_key(&quote.id) {
            return Err(RepositoryError::Duplicate(format!("quote '{}'", quote.id)));
        }
        quotes.insert(quote.id, quote.clone());
        debug!("Stored quote");
        Ok(())
    }
}

/// In-memory policy storage
#[derive(Debug, Default, Clone)]
pub struct InMemoryPolicyRepository {
    policies: Arc<RwLock<HashMap<PolicyId, Policy>>>,
}

impl InMemoryPolicyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.policies.read().await.len()
    }
}

impl DomainPort for InMemoryPolicyRepository {}

#[async_trait]
impl PolicyRepository for InMemoryPolicyRepository {
    async fn find_by_id_and_partner(
        &self,
        id: &PolicyId,
        partner_id: &PartnerId,
    ) -> Result<Option<Policy>, RepositoryError> {
        Ok(self
            .policies
            .read()
            .await
            .get(id)
            .filter(|policy| &policy.partner_id == partner_id)
            .cloned())
    }

    #[instrument(skip(self, policy), fields(policy_id = %policy.id))]
    async fn insert(&self, policy: &Policy) -> Result<(), RepositoryError> {
        let mut policies = self.policies.write().await;
        if policies.contains_key(&policy.id) {
            return Err(RepositoryError::Duplicate(format!("policy '{}'", policy.id)));
        }
        policies.insert(policy.id, policy.clone());
        debug!("Stored policy");
        Ok(())
    }
}
