//! Cache Infrastructure Layer
//!
//! This crate provides the key/value cache abstraction used to hold
//! short-lived credentials, together with its backends.
//!
//! # Architecture
//!
//! Consumers depend on the [`CacheStore`] port only. The backend is chosen at
//! wiring time:
//! - [`InMemoryCacheStore`] - process-local map with per-entry expiry
//! - `RedisCacheStore` - shared store, behind the `redis` cargo feature
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use infra_cache::{CacheStore, InMemoryCacheStore};
//!
//! let cache = InMemoryCacheStore::new();
//! cache.set("insurance-provider-jwt-token", "abc", Duration::from_secs(600)).await?;
//! assert_eq!(cache.get("insurance-provider-jwt-token").await?, Some("abc".to_string()));
//! ```

pub mod error;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;
pub mod store;

pub use error::CacheError;
pub use memory::InMemoryCacheStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisCacheStore;
pub use store::CacheStore;
