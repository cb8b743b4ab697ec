//! Quote entity and the sex code shared with the provider

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use core_kernel::{PartnerId, QuoteId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Sex code understood by the insurance provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "N")]
    Neutral,
}

impl Sex {
    /// Upper-case provider code
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Neutral => "N",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a sex code is not one of `M`, `F`, `N`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sex code: {0:?}")]
pub struct ParseSexError(pub String);

impl FromStr for Sex {
    type Err = ParseSexError;

    /// Parses a sex code, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "M" => Ok(Sex::Male),
            "F" => Ok(Sex::Female),
            "N" => Ok(Sex::Neutral),
            _ => Err(ParseSexError(s.to_string())),
        }
    }
}

/// A priced quotation obtained from the provider for a partner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    /// Quotation identifier issued by the provider
    pub provider_id: Uuid,
    pub partner_id: PartnerId,
    pub age: u8,
    pub sex: Sex,
    pub price: Decimal,
    /// Last instant at which the quotation can be turned into a policy
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
