//! The cache port

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Generic string key/value store with per-entry time-to-live
///
/// `get` distinguishes three outcomes: a stored value (`Ok(Some)`), an absent
/// or expired key (`Ok(None)`), and a backend failure (`Err`). A stored empty
/// string is a value, not a miss.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Reads the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, replacing any previous entry
    ///
    /// # Arguments
    ///
    /// * `key` - Cache key
    /// * `value` - Value to store
    /// * `ttl` - Lifetime of the entry; `Duration::ZERO` keeps it until replaced
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}
