//! In-memory cache backend

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use core_kernel::{Clock, SystemClock};
use tokio::sync::RwLock;

use crate::error::CacheError;
use crate::store::CacheStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// Process-local cache with per-entry expiry
///
/// Expired entries are never returned; they are evicted lazily on the next
/// write or by [`InMemoryCacheStore::purge_expired`].
#[derive(Clone)]
pub struct InMemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCacheStore {
    /// Creates an empty store on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Removes every expired entry and returns how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCacheStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = self.clock.now();
        let expires_at = (!ttl.is_zero()).then(|| now + ttl);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::MockClock;

    #[tokio::test]
    async fn test_missing_key_is_a_miss() {
        let cache = InMemoryCacheStore::new();
        assert_eq!(cache.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_value_is_not_a_miss() {
        let cache = InMemoryCacheStore::new();
        cache.set("key", "", Duration::from_secs(10)).await.unwrap();
        assert_eq!(cache.get("key").await.unwrap(), Some(String::new()));
    }

    #[tokio::test]
    async fn test_entry_expires_exactly_at_ttl() {
        let clock = MockClock::new();
        let cache = InMemoryCacheStore::with_clock(Arc::new(clock.clone()));
        cache.set("key", "value", Duration::from_secs(600)).await.unwrap();

        clock.advance(Duration::from_secs(599));
        assert_eq!(cache.get("key").await.unwrap().as_deref(), Some("value"));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_expires() {
        let clock = MockClock::new();
        let cache = InMemoryCacheStore::with_clock(Arc::new(clock.clone()));
        cache.set("key", "value", Duration::ZERO).await.unwrap();

        clock.advance(Duration::from_secs(86_400 * 365));
        assert_eq!(cache.get("key").await.unwrap().as_deref(), Some("value"));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let clock = MockClock::new();
        let cache = InMemoryCacheStore::with_clock(Arc::new(clock.clone()));
        cache.set("short", "a", Duration::from_secs(1)).await.unwrap();
        cache.set("long", "b", Duration::from_secs(100)).await.unwrap();

        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
    }
}
