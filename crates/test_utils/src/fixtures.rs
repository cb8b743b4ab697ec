//! Pre-built Test Fixtures
//!
//! Provider wire payloads and domain records with predictable values.

use chrono::{DateTime, TimeZone, Utc};
use domain_partner::{Partner, PolicyApplication, Sex};
use serde_json::{json, Value};
use uuid::Uuid;

/// API key used by test provider configurations
pub const TEST_API_KEY: &str = "secret";

/// Token returned by the mocked auth endpoint
pub const TEST_ACCESS_TOKEN: &str = "fake-token";

/// Fixture for provider JSON payloads
pub struct WireFixtures;

impl WireFixtures {
    /// `{"access_token": token}`
    pub fn auth(token: &str) -> Value {
        json!({ "access_token": token })
    }

    /// A quotation response
    pub fn quotation(id: Uuid, age: u8, sex: &str, price: f64, expire_at: &str) -> Value {
        json!({
            "id": id,
            "age": age,
            "sex": sex,
            "price": price,
            "expire_at": expire_at,
        })
    }

    /// A policy response
    pub fn policy(id: Uuid, quotation_id: Uuid, name: &str, sex: &str, date_of_birth: &str) -> Value {
        json!({
            "id": id,
            "quotation_id": quotation_id,
            "name": name,
            "sex": sex,
            "date_of_birth": date_of_birth,
        })
    }

    /// The provider's 4xx error envelope
    pub fn error(message: &str) -> Value {
        json!({ "message": message })
    }
}

/// Fixture for partner domain records
pub struct PartnerFixtures;

impl PartnerFixtures {
    /// A valid 14-digit CNPJ
    pub fn cnpj() -> &'static str {
        "12345678000199"
    }

    pub fn partner() -> Partner {
        Partner::new("Seguros Exemplo", Self::cnpj())
    }

    pub fn policy_application(quotation_id: Uuid) -> PolicyApplication {
        PolicyApplication {
            quotation_id,
            name: "Maria Silva".to_string(),
            sex: Sex::Female,
            date_of_birth: "1990-05-20".to_string(),
        }
    }
}

/// Fixture for dates used in provider scenarios
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Provider expiry date far in the future
    pub fn far_expiry() -> &'static str {
        "2999-03-24"
    }

    /// `far_expiry()` normalized to end of day in UTC
    pub fn far_expiry_end_of_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2999, 3, 24, 23, 59, 59)
            .single()
            .expect("far expiry is a valid UTC timestamp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Timezone;

    #[test]
    fn test_far_expiry_end_of_day_matches_parsed_date() {
        let parsed = Timezone::default()
            .parse_end_of_day(TemporalFixtures::far_expiry())
            .unwrap();
        assert_eq!(TemporalFixtures::far_expiry_end_of_day(), parsed);
        assert!(TemporalFixtures::far_expiry_end_of_day() > Utc::now());
    }
}
