//! Clock abstraction for time-dependent components.
//!
//! The circuit breaker and the in-memory cache both make decisions based on
//! elapsed time. They read time through [`Clock`] so tests can move it
//! forward explicitly instead of sleeping.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of monotonic time.
pub trait Clock: Send + Sync + 'static {
    /// Return the current instant.
    fn now(&self) -> Instant;
}

/// Live implementation backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Mock clock for tests.
///
/// `now()` returns a fixed instant that only moves when `advance()` is
/// called. Clones share the same underlying time.
#[derive(Clone)]
pub struct MockClock {
    current: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Create a mock clock fixed at the moment of construction.
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Advance the clock by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += duration;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockClock").finish_non_exhaustive()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_only_moves_on_advance() {
        let clock = MockClock::new();
        let start = clock.now();
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_secs(30));
        assert_eq!(clock.now() - start, Duration::from_secs(30));
    }

    #[test]
    fn mock_clock_clones_share_time() {
        let clock = MockClock::new();
        let shared = clock.clone();
        let start = clock.now();

        shared.advance(Duration::from_millis(500));
        assert_eq!(clock.now() - start, Duration::from_millis(500));
    }
}
