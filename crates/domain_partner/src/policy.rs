//! Policy entity

use chrono::{DateTime, Utc};
use core_kernel::{PartnerId, PolicyId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quote::Sex;

/// What a partner submits to turn a quotation into a policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyApplication {
    /// Provider quotation the policy is issued from
    pub quotation_id: Uuid,
    /// Insured person's name
    pub name: String,
    pub sex: Sex,
    /// Insured person's birth date, passed to the provider as given
    pub date_of_birth: String,
}

/// A policy issued by the provider on behalf of a partner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub partner_id: PartnerId,
    /// Policy identifier issued by the provider
    pub provider_id: Uuid,
    pub quotation_id: Uuid,
    pub name: String,
    /// Sex code as recorded by the provider
    pub sex: String,
    pub date_of_birth: String,
    pub created_at: DateTime<Utc>,
}
