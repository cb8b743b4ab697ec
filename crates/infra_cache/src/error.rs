//! Cache error types

use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The backend could not be reached
    #[error("Failed to connect to cache: {0}")]
    ConnectionFailed(String),

    /// The backend answered with an error
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// The backend reported the key as absent through its error channel
    #[error("Key not found: {0}")]
    KeyNotFound(String),
}

impl CacheError {
    /// Checks if this error only means the key is absent
    ///
    /// Callers treat such errors as a cache miss; every other variant is a
    /// real failure.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::KeyNotFound(_))
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(self, CacheError::ConnectionFailed(_))
    }
}
