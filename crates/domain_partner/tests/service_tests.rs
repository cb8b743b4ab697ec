//! Workflow tests for the partner service

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{CallContext, PartnerId, PolicyId, ProviderError, ProviderErrorKind};
use domain_partner::{
    InMemoryPartnerRepository, InMemoryPolicyRepository, InMemoryQuoteRepository,
    MockInsuranceProvider, Partner, PartnerError, PartnerService, PolicyApplication,
    PolicyResult, ProviderCall, QuotationResult, QuoteRepository, Sex,
};

struct Harness {
    service: PartnerService,
    provider: Arc<MockInsuranceProvider>,
    quotes: InMemoryQuoteRepository,
    policies: InMemoryPolicyRepository,
}

fn harness() -> Harness {
    let provider = Arc::new(MockInsuranceProvider::new());
    let quotes = InMemoryQuoteRepository::new();
    let policies = InMemoryPolicyRepository::new();
    let service = PartnerService::new(
        Arc::new(InMemoryPartnerRepository::new()),
        Arc::new(quotes.clone()),
        Arc::new(policies.clone()),
        provider.clone(),
    );
    Harness {
        service,
        provider,
        quotes,
        policies,
    }
}

async fn registered_partner(h: &Harness) -> Partner {
    h.service
        .create_partner(Partner::new("Seguros Exemplo", "12345678000199"))
        .await
        .unwrap()
}

fn application() -> PolicyApplication {
    PolicyApplication {
        quotation_id: Uuid::new_v4(),
        name: "Maria Silva".to_string(),
        sex: Sex::Female,
        date_of_birth: "1990-05-20".to_string(),
    }
}

mod create_partner {
    use super::*;

    #[tokio::test]
    async fn test_registers_new_partner() {
        let h = harness();
        let partner = registered_partner(&h).await;
        assert_eq!(partner.name, "Seguros Exemplo");
    }

    #[tokio::test]
    async fn test_rejects_duplicate_cnpj() {
        let h = harness();
        registered_partner(&h).await;

        let err = h
            .service
            .create_partner(Partner::new("Another Name", "12345678000199"))
            .await
            .unwrap_err();
        assert!(matches!(err, PartnerError::PartnerAlreadyExists));
        assert_eq!(err.to_string(), "partner already exists");
    }
}

mod create_quote {
    use super::*;

    #[tokio::test]
    async fn test_stores_provider_quotation() {
        let h = harness();
        let partner = registered_partner(&h).await;
        let provider_id = Uuid::new_v4();
        let expires_at = Utc.with_ymd_and_hms(2999, 3, 24, 23, 59, 59).unwrap();
        h.provider
            .push_quotation(QuotationResult {
                provider_id,
                age: 30,
                sex: "M".to_string(),
                price: dec!(50.50),
                expires_at,
            })
            .await;

        let quote = h
            .service
            .create_quote(&CallContext::new(), &partner.id, 30, Sex::Male)
            .await
            .unwrap();

        assert_eq!(quote.provider_id, provider_id);
        assert_eq!(quote.partner_id, partner.id);
        assert_eq!(quote.price, dec!(50.50));
        assert_eq!(quote.sex, Sex::Male);
        assert_eq!(quote.expires_at, expires_at);
        assert!(h.quotes.find_by_id(&quote.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sends_upper_case_sex_code() {
        let h = harness();
        let partner = registered_partner(&h).await;
        let sex: Sex = "f".parse().unwrap();

        h.service
            .create_quote(&CallContext::new(), &partner.id, 45, sex)
            .await
            .unwrap();

        match h.provider.calls().await.as_slice() {
            [ProviderCall::CreateQuotation(request)] => {
                assert_eq!(request.sex, "F");
                assert_eq!(request.age, 45);
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_partner_skips_provider() {
        let h = harness();

        let err = h
            .service
            .create_quote(&CallContext::new(), &PartnerId::new(), 30, Sex::Male)
            .await
            .unwrap_err();

        assert!(matches!(err, PartnerError::PartnerNotFound));
        assert!(h.provider.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_is_propagated_and_nothing_stored() {
        let h = harness();
        let partner = registered_partner(&h).await;
        h.provider
            .push_failure(ProviderError::BadRequest {
                status: 422,
                message: "age out of range".to_string(),
            })
            .await;

        let err = h
            .service
            .create_quote(&CallContext::new(), &partner.id, 30, Sex::Male)
            .await
            .unwrap_err();

        match err {
            PartnerError::Provider(e) => {
                assert_eq!(e.kind(), ProviderErrorKind::BadRequest);
                assert_eq!(e.to_string(), "age out of range");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
        assert_eq!(h.quotes.count().await, 0);
    }
}

mod policies {
    use super::*;

    #[tokio::test]
    async fn test_issue_then_fetch_policy() {
        let h = harness();
        let partner = registered_partner(&h).await;
        let ctx = CallContext::new();

        let issued = h
            .service
            .create_policy(&ctx, &partner.id, application())
            .await
            .unwrap();
        assert_eq!(issued.sex, "F");
        assert_eq!(h.policies.count().await, 1);

        let fetched = h
            .service
            .get_policy(&ctx, &partner.id, &issued.id)
            .await
            .unwrap();
        assert_eq!(fetched.id, issued.id);
        assert_eq!(fetched.name, "Maria Silva");

        let calls = h.provider.calls().await;
        assert_eq!(
            calls.last(),
            Some(&ProviderCall::GetPolicy(issued.provider_id.to_string()))
        );
    }

    #[tokio::test]
    async fn test_get_policy_returns_provider_current_data() {
        let h = harness();
        let partner = registered_partner(&h).await;
        let ctx = CallContext::new();
        let issued = h
            .service
            .create_policy(&ctx, &partner.id, application())
            .await
            .unwrap();

        h.provider
            .insert_policy(PolicyResult {
                provider_id: issued.provider_id,
                quotation_id: issued.quotation_id,
                name: "Maria Silva Santos".to_string(),
                sex: "F".to_string(),
                date_of_birth: "1990-05-20".to_string(),
            })
            .await;

        let fetched = h.service.get_policy(&ctx, &partner.id, &issued.id).await.unwrap();
        assert_eq!(fetched.name, "Maria Silva Santos");
        assert_eq!(fetched.provider_id, issued.provider_id);
    }

    #[tokio::test]
    async fn test_other_partners_policy_is_not_found() {
        let h = harness();
        let owner = registered_partner(&h).await;
        let other = h
            .service
            .create_partner(Partner::new("Outra Corretora", "99999999000100"))
            .await
            .unwrap();
        let ctx = CallContext::new();
        let issued = h
            .service
            .create_policy(&ctx, &owner.id, application())
            .await
            .unwrap();

        let err = h
            .service
            .get_policy(&ctx, &other.id, &issued.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PartnerError::PolicyNotFound));
    }

    #[tokio::test]
    async fn test_unknown_policy_skips_provider() {
        let h = harness();
        let partner = registered_partner(&h).await;

        let err = h
            .service
            .get_policy(&CallContext::new(), &partner.id, &PolicyId::new())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(h.provider.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_context_fails_policy_creation() {
        let h = harness();
        let partner = registered_partner(&h).await;
        let ctx = CallContext::new();
        ctx.cancellation().cancel();

        let err = h
            .service
            .create_policy(&ctx, &partner.id, application())
            .await
            .unwrap_err();

        assert!(matches!(err, PartnerError::Provider(ProviderError::Cancelled)));
        assert_eq!(h.policies.count().await, 0);
    }
}
