//! Unit tests for the Identifiers module

use core_kernel::{PartnerId, PolicyId, QuoteId};
use std::collections::HashSet;
use uuid::Uuid;

mod creation {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let ids: HashSet<PartnerId> = (0..100).map(|_| PartnerId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_new_ids_are_version_7() {
        assert_eq!(QuoteId::new().as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        assert_eq!(*PolicyId::from_uuid(uuid).as_uuid(), uuid);
    }
}

mod display_and_parse {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(PartnerId::prefix(), "PRT");
        assert_eq!(QuoteId::prefix(), "QTE");
        assert_eq!(PolicyId::prefix(), "POL");
    }

    #[test]
    fn test_display_roundtrip() {
        let id = QuoteId::new();
        let parsed: QuoteId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_foreign_prefix_is_rejected() {
        let partner = PartnerId::new();
        assert!(partner.to_string().parse::<PolicyId>().is_err());
    }

    #[test]
    fn test_uuid_conversion() {
        let id = PartnerId::new();
        let uuid: Uuid = id.into();
        assert_eq!(PartnerId::from(uuid), id);
    }
}
