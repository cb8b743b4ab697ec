//! Provider client tests against a mock insurer

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use core_kernel::{CallContext, ProviderErrorKind, Timezone};
use domain_partner::{InsuranceProvider, PolicyRequest, QuotationRequest, Sex};
use infra_cache::{CacheError, CacheStore, InMemoryCacheStore};
use infra_provider::{InsuranceProviderClient, ProviderConfig, TOKEN_CACHE_KEY};
use test_utils::{
    assert_bad_request, assert_internal_with_body, assert_provider_error_kind, ProviderHarness,
    ScriptedCacheStore, TemporalFixtures, WireFixtures, TEST_ACCESS_TOKEN,
};

fn quotation_response(id: Uuid) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(WireFixtures::quotation(
        id,
        30,
        "F",
        120.99,
        TemporalFixtures::far_expiry(),
    ))
}

mod quotations {
    use super::*;

    #[tokio::test]
    async fn test_create_quotation_authenticates_and_maps_response() {
        let harness = ProviderHarness::start().await;
        harness.mount_auth(TEST_ACCESS_TOKEN, 1).await;
        let id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/quotations"))
            .and(header("authorization", "Bearer fake-token"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "age": 30, "sex": "F" })))
            .respond_with(quotation_response(id))
            .expect(1)
            .mount(&harness.server)
            .await;

        let result = harness
            .client
            .create_quotation(&harness.ctx(), QuotationRequest::new(30, Sex::Female))
            .await
            .unwrap();

        assert_eq!(result.provider_id, id);
        assert_eq!(result.age, 30);
        assert_eq!(result.sex, "F");
        assert_eq!(result.price, dec!(120.99));
        assert_eq!(result.expires_at, TemporalFixtures::far_expiry_end_of_day());
        assert_eq!(
            harness.cache.get(TOKEN_CACHE_KEY).await.unwrap().as_deref(),
            Some(TEST_ACCESS_TOKEN)
        );
    }

    #[tokio::test]
    async fn test_sex_is_sent_verbatim() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;

        Mock::given(method("POST"))
            .and(path("/quotations"))
            .and(body_json(serde_json::json!({ "age": 20, "sex": "f" })))
            .respond_with(quotation_response(Uuid::new_v4()))
            .expect(1)
            .mount(&harness.server)
            .await;

        let request = QuotationRequest {
            age: 20,
            sex: "f".to_string(),
        };
        harness
            .client
            .create_quotation(&harness.ctx(), request)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expiry_uses_configured_timezone() {
        let harness = ProviderHarness::builder()
            .with_timezone(sao_paulo())
            .start()
            .await;
        harness.seed_token().await;
        Mock::given(method("POST"))
            .and(path("/quotations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(WireFixtures::quotation(
                Uuid::new_v4(),
                40,
                "M",
                99.5,
                "2030-07-01",
            )))
            .mount(&harness.server)
            .await;

        let result = harness
            .client
            .create_quotation(&harness.ctx(), QuotationRequest::new(40, Sex::Male))
            .await
            .unwrap();

        // 23:59:59 in Sao Paulo (UTC-3) is 02:59:59 UTC the next day
        assert_eq!(result.expires_at, Utc.with_ymd_and_hms(2030, 7, 2, 2, 59, 59).unwrap());
    }

    fn sao_paulo() -> Timezone {
        serde_json::from_str("\"America/Sao_Paulo\"").unwrap()
    }

    #[tokio::test]
    async fn test_invalid_expiry_date_is_an_error() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;
        Mock::given(method("POST"))
            .and(path("/quotations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(WireFixtures::quotation(
                Uuid::new_v4(),
                30,
                "F",
                10.0,
                "invalid-date",
            )))
            .mount(&harness.server)
            .await;

        let result = harness
            .client
            .create_quotation(&harness.ctx(), QuotationRequest::new(30, Sex::Female))
            .await;
        assert_provider_error_kind(&result, ProviderErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_internal() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;
        Mock::given(method("POST"))
            .and(path("/quotations"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&harness.server)
            .await;

        let error = harness
            .client
            .create_quotation(&harness.ctx(), QuotationRequest::new(30, Sex::Female))
            .await
            .unwrap_err();
        assert_internal_with_body(&error, "not json");
    }
}

mod policies {
    use super::*;

    #[tokio::test]
    async fn test_create_policy_maps_wire_names() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;
        let policy_id = Uuid::new_v4();
        let quotation_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/policies"))
            .and(body_json(serde_json::json!({
                "quotation_id": quotation_id,
                "name": "quotation-test",
                "sex": "F",
                "date_of_birth": "1998-09-28",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(WireFixtures::policy(
                policy_id,
                quotation_id,
                "quotation-test",
                "F",
                "1998-09-28",
            )))
            .expect(1)
            .mount(&harness.server)
            .await;

        let result = harness
            .client
            .create_policy(
                &harness.ctx(),
                PolicyRequest {
                    quotation_id,
                    name: "quotation-test".to_string(),
                    sex: "F".to_string(),
                    date_of_birth: "1998-09-28".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.provider_id, policy_id);
        assert_eq!(result.quotation_id, quotation_id);
        assert_eq!(result.date_of_birth, "1998-09-28");
    }

    #[tokio::test]
    async fn test_get_policy_not_found_message_is_verbatim() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;

        Mock::given(method("GET"))
            .and(path("/policies/missing-id"))
            .respond_with(ResponseTemplate::new(404).set_body_json(WireFixtures::error("policy not found")))
            .expect(1)
            .mount(&harness.server)
            .await;

        let error = harness
            .client
            .get_policy(&harness.ctx(), "missing-id")
            .await
            .unwrap_err();
        assert_bad_request(&error, 404, "policy not found");
        assert_eq!(error.to_string(), "policy not found");
    }

    #[tokio::test]
    async fn test_non_json_client_error_keeps_raw_body() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;
        Mock::given(method("GET"))
            .and(path("/policies/abc"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bad Gateway Page"))
            .mount(&harness.server)
            .await;

        let error = harness
            .client
            .get_policy(&harness.ctx(), "abc")
            .await
            .unwrap_err();
        assert_internal_with_body(&error, "Bad Gateway Page");
        assert_eq!(error.to_string(), "unexpected client error: Bad Gateway Page");
    }

    #[tokio::test]
    async fn test_server_error_is_internal() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;
        Mock::given(method("GET"))
            .and(path("/policies/abc"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&harness.server)
            .await;

        let error = harness
            .client
            .get_policy(&harness.ctx(), "abc")
            .await
            .unwrap_err();
        assert_internal_with_body(&error, "boom");
        assert_eq!(error.status(), Some(500));
    }

    #[tokio::test]
    async fn test_unsafe_policy_ids_never_leave_the_client() {
        let harness = ProviderHarness::start().await;
        harness.mount_auth("unused", 0).await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&harness.server)
            .await;

        for policy_id in ["../auth", "a/b", "..", ".", "", "abc?x=1", "%2e%2e"] {
            let error = harness
                .client
                .get_policy(&harness.ctx(), policy_id)
                .await
                .unwrap_err();
            assert_bad_request(&error, 400, &format!("invalid policy id: {policy_id:?}"));
        }
    }
}

mod credentials {
    use super::*;

    #[tokio::test]
    async fn test_two_calls_authenticate_once() {
        let harness = ProviderHarness::start().await;
        harness.mount_auth(TEST_ACCESS_TOKEN, 1).await;
        Mock::given(method("POST"))
            .and(path("/quotations"))
            .respond_with(quotation_response(Uuid::new_v4()))
            .expect(2)
            .mount(&harness.server)
            .await;

        for _ in 0..2 {
            harness
                .client
                .create_quotation(&harness.ctx(), QuotationRequest::new(30, Sex::Female))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_cached_token_skips_authentication() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;
        harness.mount_auth("unused", 0).await;
        Mock::given(method("GET"))
            .and(path("/policies/abc"))
            .and(header("authorization", "Bearer fake-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(WireFixtures::policy(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "Maria",
                "F",
                "1990-01-01",
            )))
            .expect(1)
            .mount(&harness.server)
            .await;

        harness.client.get_policy(&harness.ctx(), "abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_cached_token_reauthenticates() {
        let harness = ProviderHarness::start().await;
        harness
            .cache
            .set(TOKEN_CACHE_KEY, "", Duration::from_secs(600))
            .await
            .unwrap();
        harness.mount_auth("fresh-token", 1).await;
        Mock::given(method("GET"))
            .and(path("/policies/abc"))
            .and(header("authorization", "Bearer fresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(WireFixtures::policy(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "Maria",
                "F",
                "1990-01-01",
            )))
            .expect(1)
            .mount(&harness.server)
            .await;

        harness.client.get_policy(&harness.ctx(), "abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_api_key_is_authentication_error() {
        let harness = ProviderHarness::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(401).set_body_json(WireFixtures::error("invalid key")))
            .expect(1)
            .mount(&harness.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/quotations"))
            .respond_with(quotation_response(Uuid::new_v4()))
            .expect(0)
            .mount(&harness.server)
            .await;

        let result = harness
            .client
            .create_quotation(&harness.ctx(), QuotationRequest::new(30, Sex::Female))
            .await;

        assert_provider_error_kind(&result, ProviderErrorKind::Authentication);
        assert_eq!(harness.cache.get(TOKEN_CACHE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_access_token_is_authentication_error() {
        let harness = ProviderHarness::start().await;
        harness.mount_auth("", 1).await;

        let result = harness.client.get_policy(&harness.ctx(), "abc").await;
        assert_provider_error_kind(&result, ProviderErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_cache_read_failure_is_not_a_miss() {
        let cache = Arc::new(ScriptedCacheStore::new());
        cache.push_get(Err(CacheError::ConnectionFailed("redis down".into())));
        let harness = ProviderHarness::builder().with_cache(cache.clone()).start().await;
        harness.mount_auth(TEST_ACCESS_TOKEN, 0).await;

        let result = harness.client.get_policy(&harness.ctx(), "abc").await;

        assert_provider_error_kind(&result, ProviderErrorKind::Cache);
        assert!(cache.writes().is_empty());
    }

    #[tokio::test]
    async fn test_key_not_found_error_is_a_miss() {
        let cache = Arc::new(ScriptedCacheStore::new());
        cache.push_get(Err(CacheError::KeyNotFound(TOKEN_CACHE_KEY.into())));
        let harness = ProviderHarness::builder().with_cache(cache.clone()).start().await;
        harness.mount_auth(TEST_ACCESS_TOKEN, 1).await;
        Mock::given(method("POST"))
            .and(path("/quotations"))
            .respond_with(quotation_response(Uuid::new_v4()))
            .mount(&harness.server)
            .await;

        harness
            .client
            .create_quotation(&harness.ctx(), QuotationRequest::new(30, Sex::Female))
            .await
            .unwrap();

        let writes = cache.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].ttl, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_cache_write_failure_fails_the_call() {
        let cache = Arc::new(ScriptedCacheStore::new());
        cache.fail_sets(CacheError::Backend("read only replica".into()));
        let harness = ProviderHarness::builder().with_cache(cache.clone()).start().await;
        harness.mount_auth(TEST_ACCESS_TOKEN, 1).await;
        Mock::given(method("POST"))
            .and(path("/quotations"))
            .respond_with(quotation_response(Uuid::new_v4()))
            .expect(0)
            .mount(&harness.server)
            .await;

        let result = harness
            .client
            .create_quotation(&harness.ctx(), QuotationRequest::new(30, Sex::Female))
            .await;
        assert_provider_error_kind(&result, ProviderErrorKind::Cache);
    }
}

mod interruption {
    use super::*;

    #[tokio::test]
    async fn test_deadline_aborts_slow_provider() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;
        Mock::given(method("GET"))
            .and(path("/policies/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&harness.server)
            .await;

        let ctx = CallContext::new().with_timeout(Duration::from_millis(100));
        let result = harness.client.get_policy(&ctx, "slow").await;
        assert_provider_error_kind(&result, ProviderErrorKind::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_call() {
        let harness = ProviderHarness::start().await;
        harness.seed_token().await;
        Mock::given(method("GET"))
            .and(path("/policies/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&harness.server)
            .await;

        let token = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(token.clone());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let result = harness.client.get_policy(&ctx, "slow").await;
        assert_provider_error_kind(&result, ProviderErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        cache
            .set(TOKEN_CACHE_KEY, TEST_ACCESS_TOKEN, Duration::from_secs(600))
            .await
            .unwrap();
        let client = InsuranceProviderClient::from_config(
            ProviderConfig::new("http://127.0.0.1:1", "secret"),
            cache,
        )
        .unwrap();

        let result = client.get_policy(&CallContext::new(), "abc").await;
        assert_provider_error_kind(&result, ProviderErrorKind::Transport);
    }
}
