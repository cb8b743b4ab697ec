//! Partner DTOs

use chrono::{DateTime, Utc};
use domain_partner::{Partner, Policy, PolicyApplication, Quote, Sex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Sex codes accepted from partners, in either case
pub const SEX_CODES: [&str; 6] = ["m", "M", "f", "F", "n", "N"];

fn validate_sex(sex: &str) -> Result<(), ValidationError> {
    if SEX_CODES.contains(&sex) {
        return Ok(());
    }
    let mut error = ValidationError::new("oneof");
    error.message = Some(format!("'{sex}' must be one of m, M, f, F, n, N").into());
    Err(error)
}

fn parse_sex(sex: &str) -> Sex {
    sex.parse().unwrap_or(Sex::Neutral)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartnerRequest {
    #[validate(length(min = 3, max = 255))]
    pub name: String,
    #[validate(length(equal = 14))]
    pub cnpj: String,
}

#[derive(Debug, Serialize)]
pub struct PartnerResponse {
    pub id: Uuid,
    pub name: String,
    pub cnpj: String,
    pub created_at: DateTime<Utc>,
}

impl From<Partner> for PartnerResponse {
    fn from(partner: Partner) -> Self {
        Self {
            id: *partner.id.as_uuid(),
            name: partner.name,
            cnpj: partner.cnpj,
            created_at: partner.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    #[validate(range(min = 0, max = 99))]
    pub age: i64,
    #[validate(custom(function = "validate_sex"))]
    pub sex: String,
}

impl CreateQuoteRequest {
    /// Age and sex in domain types; call only after validation
    pub fn into_parts(self) -> (u8, Sex) {
        let age = u8::try_from(self.age).unwrap_or_default();
        (age, parse_sex(&self.sex))
    }
}

/// Quote as shown to partners, identified by the provider's quotation id
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub id: Uuid,
    pub age: u8,
    pub sex: Sex,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            id: quote.provider_id,
            age: quote.age,
            sex: quote.sex,
            price: quote.price,
            expires_at: quote.expires_at,
            created_at: quote.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePolicyRequest {
    pub quotation_id: Uuid,
    #[validate(length(min = 3, max = 255))]
    pub name: String,
    #[validate(custom(function = "validate_sex"))]
    pub sex: String,
    #[validate(length(min = 1))]
    pub date_of_birth: String,
}

impl From<CreatePolicyRequest> for PolicyApplication {
    fn from(request: CreatePolicyRequest) -> Self {
        Self {
            quotation_id: request.quotation_id,
            name: request.name,
            sex: parse_sex(&request.sex),
            date_of_birth: request.date_of_birth,
        }
    }
}

/// Policy as shown to partners, identified by its local id
#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub id: Uuid,
    pub sex: String,
    pub name: String,
    pub quotation_id: Uuid,
    pub date_of_birth: String,
}

impl From<Policy> for PolicyResponse {
    fn from(policy: Policy) -> Self {
        Self {
            id: *policy.id.as_uuid(),
            sex: policy.sex,
            name: policy.name,
            quotation_id: policy.quotation_id,
            date_of_birth: policy.date_of_birth,
        }
    }
}
