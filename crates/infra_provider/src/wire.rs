//! Provider wire formats
//!
//! Field names here follow the provider's JSON exactly; the client maps them
//! to domain names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuotationBody<'a> {
    pub age: u8,
    pub sex: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuotationResponse {
    pub id: Uuid,
    pub sex: String,
    pub expire_at: String,
    pub age: u8,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PolicyBody<'a> {
    pub quotation_id: Uuid,
    pub name: &'a str,
    pub sex: &'a str,
    pub date_of_birth: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PolicyResponse {
    pub id: Uuid,
    pub quotation_id: Uuid,
    pub date_of_birth: String,
    pub name: String,
    pub sex: String,
}

/// Error envelope the provider sends with 4xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub message: String,
}
