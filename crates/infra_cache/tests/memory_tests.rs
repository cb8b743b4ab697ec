//! Behavioural tests for the in-memory cache backend

use std::sync::Arc;
use std::time::Duration;

use core_kernel::MockClock;
use infra_cache::{CacheStore, InMemoryCacheStore};
use proptest::prelude::*;

#[tokio::test]
async fn test_set_replaces_previous_value_and_ttl() {
    let clock = MockClock::new();
    let cache = InMemoryCacheStore::with_clock(Arc::new(clock.clone()));

    cache.set("token", "first", Duration::from_secs(5)).await.unwrap();
    clock.advance(Duration::from_secs(4));
    cache.set("token", "second", Duration::from_secs(5)).await.unwrap();
    clock.advance(Duration::from_secs(4));

    assert_eq!(cache.get("token").await.unwrap().as_deref(), Some("second"));
}

#[tokio::test]
async fn test_concurrent_writers_and_readers() {
    let cache = InMemoryCacheStore::new();

    let mut handles = Vec::new();
    for i in 0..32 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            let key = format!("key-{}", i % 4);
            cache.set(&key, &i.to_string(), Duration::from_secs(60)).await.unwrap();
            cache.get(&key).await.unwrap()
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }
    assert_eq!(cache.len().await, 4);
}

#[tokio::test]
async fn test_clones_share_entries() {
    let cache = InMemoryCacheStore::new();
    let shared = cache.clone();
    cache.set("k", "v", Duration::from_secs(1)).await.unwrap();
    assert_eq!(shared.get("k").await.unwrap().as_deref(), Some("v"));
}

proptest! {
    #[test]
    fn prop_entry_visible_until_ttl(ttl_secs in 1u64..10_000, elapsed in 0u64..20_000) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let clock = MockClock::new();
            let cache = InMemoryCacheStore::with_clock(Arc::new(clock.clone()));
            cache.set("k", "v", Duration::from_secs(ttl_secs)).await.unwrap();
            clock.advance(Duration::from_secs(elapsed));

            let hit = cache.get("k").await.unwrap().is_some();
            assert_eq!(hit, elapsed < ttl_secs);
        });
    }
}
