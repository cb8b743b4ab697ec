//! Strongly-typed identifiers for broker entities
//!
//! Local records (partners, quotes, policies) get prefixed newtype ids so a
//! partner id can never be passed where a policy id is expected. Identifiers
//! issued by the insurance provider stay plain UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new time-ordered identifier (v7)
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Path parameters may arrive with or without the prefix
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(PartnerId, "PRT");
define_id!(QuoteId, "QTE");
define_id!(PolicyId, "POL");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partner_id_display() {
        let id = PartnerId::new();
        assert!(id.to_string().starts_with("PRT-"));
    }

    #[test]
    fn test_id_parsing_with_and_without_prefix() {
        let original = PolicyId::new();
        let parsed: PolicyId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: PolicyId = original.as_uuid().to_string().parse().unwrap();
        assert_eq!(original, bare);
    }

    #[test]
    fn test_id_parsing_rejects_garbage() {
        assert!("missing-id".parse::<QuoteId>().is_err());
    }

    #[test]
    fn test_new_ids_are_time_ordered() {
        let first = QuoteId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = QuoteId::new();
        assert!(first.as_uuid() < second.as_uuid());
    }

    #[test]
    fn test_json_is_transparent() {
        let uuid = Uuid::new_v4();
        let id = PartnerId::from(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
