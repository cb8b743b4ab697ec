//! Test Doubles
//!
//! Hand-written stand-ins for the cache and the authenticator that record
//! how they were used.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use core_kernel::{CallContext, ProviderError};
use infra_cache::{CacheError, CacheStore, InMemoryCacheStore};
use infra_provider::{AccessToken, Authenticator, Credential};

/// A `set` received by [`ScriptedCacheStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheWrite {
    pub key: String,
    pub value: String,
    pub ttl: Duration,
}

/// Cache store whose failures can be scripted
///
/// Scripted `get` results are returned first, one per call; after that reads
/// and writes go to an in-memory store. Every write is recorded.
#[derive(Debug, Default)]
pub struct ScriptedCacheStore {
    backing: InMemoryCacheStore,
    get_results: Mutex<VecDeque<Result<Option<String>, CacheError>>>,
    set_failure: Mutex<Option<CacheError>>,
    writes: Mutex<Vec<CacheWrite>>,
    reads: AtomicUsize,
}

impl ScriptedCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result of the next `get`
    pub fn push_get(&self, result: Result<Option<String>, CacheError>) {
        self.get_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
    }

    /// Makes every `set` fail with `error`
    pub fn fail_sets(&self, error: CacheError) {
        *self.set_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }

    /// Writes received so far, successful or not
    pub fn writes(&self) -> Vec<CacheWrite> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of `get` calls received
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for ScriptedCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .get_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match scripted {
            Some(result) => result,
            None => self.backing.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(CacheWrite {
                key: key.to_string(),
                value: value.to_string(),
                ttl,
            });
        let failure = self.set_failure.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match failure {
            Some(error) => Err(error),
            None => self.backing.set(key, value, ttl).await,
        }
    }
}

/// Authenticator that counts calls and returns a fixed outcome
#[derive(Debug)]
pub struct CountingAuthenticator {
    outcome: Result<String, ProviderError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl CountingAuthenticator {
    /// Always returns `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            outcome: Ok(token.into()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails with `error`
    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Waits `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for CountingAuthenticator {
    async fn authenticate(&self, ctx: &CallContext) -> Result<Credential, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            ctx.run(tokio::time::sleep(self.delay)).await?;
        }
        self.outcome
            .clone()
            .map(|token| Credential::new(AccessToken::new(token)))
    }
}
