//! Circuit breaker for provider calls
//!
//! A three-state machine:
//!
//! - **Closed**: calls pass through; outcomes are counted. Counts are cleared
//!   every `interval` so sparse failures never accumulate into a trip.
//! - **Open**: calls are rejected with `ProviderError::CircuitOpen` without
//!   touching the network, until `open_timeout` has elapsed.
//! - **Half-Open**: at most `half_open_max_requests` probes are admitted. That
//!   many consecutive successes close the circuit; any failure reopens it.
//!
//! The circuit trips when consecutive failures *exceed* `failure_threshold`.
//!
//! Each state change starts a new generation. An outcome reported for a call
//! admitted in an older generation is ignored, so a slow call started before
//! a trip cannot close or reopen the circuit afterwards.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use core_kernel::{CircuitBreakerConfig, Clock, ProviderError, SystemClock};

/// Runtime state of a circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        })
    }
}

/// Outcome counters for the current generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    /// Calls admitted
    pub requests: u32,
    pub total_successes: u32,
    pub total_failures: u32,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

impl Counts {
    fn on_success(&mut self) {
        self.total_successes = self.total_successes.saturating_add(1);
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        self.consecutive_failures = 0;
    }

    fn on_failure(&mut self) {
        self.total_failures = self.total_failures.saturating_add(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_successes = 0;
    }
}

/// How a finished call is accounted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    /// Not evidence about upstream health; the admission is released
    Ignored,
}

impl Outcome {
    /// Classifies a provider call result
    ///
    /// A bad request (4xx with a message) proves the provider is answering,
    /// so it counts as a success. Cache errors, caller cancellation and
    /// rejections by another breaker say nothing about the provider.
    pub fn of<T>(result: &Result<T, ProviderError>) -> Self {
        match result {
            Ok(_) => Outcome::Success,
            Err(e) if e.indicates_provider_failure() => Outcome::Failure,
            Err(ProviderError::BadRequest { .. }) => Outcome::Success,
            Err(_) => Outcome::Ignored,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    generation: u64,
    counts: Counts,
    /// End of the closed counting window, or of the open cool-down
    expiry: Option<Instant>,
}

/// Thread-safe circuit breaker
///
/// The internal mutex only guards bookkeeping; it is never held while the
/// protected call runs.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker on the system clock
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self::with_clock(name, config, Arc::new(SystemClock))
    }

    /// Creates a closed breaker reading time from `clock`
    pub fn with_clock(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let expiry = config
            .interval()
            .and_then(|interval| clock.now().checked_add(interval));
        Self {
            name: name.into(),
            config,
            clock,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                generation: 0,
                counts: Counts::default(),
                expiry,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state, applying any timer-driven transition first
    pub fn state(&self) -> CircuitState {
        let now = self.clock.now();
        let mut inner = self.lock();
        self.refresh(&mut inner, now);
        inner.state
    }

    /// Counters of the current generation
    pub fn counts(&self) -> Counts {
        let now = self.clock.now();
        let mut inner = self.lock();
        self.refresh(&mut inner, now);
        inner.counts
    }

    /// Runs `call` if the circuit admits it and records the outcome
    ///
    /// # Errors
    ///
    /// `ProviderError::CircuitOpen` without running `call` when the circuit
    /// is open or every half-open probe slot is taken; otherwise whatever
    /// `call` returns.
    pub async fn call<T, F>(&self, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let mut admission = self.admit()?;
        let result = call.await;
        admission.finish(Outcome::of(&result));
        result
    }

    /// Admits one call, returning a ticket that must be finished
    ///
    /// Dropping the ticket unfinished releases the admission without
    /// recording an outcome.
    pub fn admit(&self) -> Result<Admission<'_>, ProviderError> {
        let now = self.clock.now();
        let mut inner = self.lock();
        self.refresh(&mut inner, now);

        let rejected = match inner.state {
            CircuitState::Open => true,
            CircuitState::HalfOpen => inner.counts.requests >= self.half_open_limit(),
            CircuitState::Closed => false,
        };
        if rejected {
            return Err(ProviderError::CircuitOpen {
                name: self.name.clone(),
            });
        }

        inner.counts.requests = inner.counts.requests.saturating_add(1);
        Ok(Admission {
            breaker: self,
            generation: inner.generation,
            finished: false,
        })
    }

    fn record(&self, generation: u64, outcome: Outcome) {
        let now = self.clock.now();
        let mut inner = self.lock();
        self.refresh(&mut inner, now);
        if inner.generation != generation {
            return;
        }

        match outcome {
            Outcome::Success => {
                inner.counts.on_success();
                if inner.state == CircuitState::HalfOpen
                    && inner.counts.consecutive_successes >= self.half_open_limit()
                {
                    self.transition(&mut inner, CircuitState::Closed, now);
                }
            }
            Outcome::Failure => {
                inner.counts.on_failure();
                let trip = match inner.state {
                    CircuitState::Closed => {
                        inner.counts.consecutive_failures > self.config.failure_threshold
                    }
                    CircuitState::HalfOpen => true,
                    CircuitState::Open => false,
                };
                if trip {
                    self.transition(&mut inner, CircuitState::Open, now);
                }
            }
            Outcome::Ignored => {
                inner.counts.requests = inner.counts.requests.saturating_sub(1);
            }
        }
    }

    /// Applies timer-driven transitions
    fn refresh(&self, inner: &mut Inner, now: Instant) {
        let expired = inner.expiry.is_some_and(|expiry| expiry <= now);
        match inner.state {
            CircuitState::Closed if expired => self.new_generation(inner, now),
            CircuitState::Open if expired => self.transition(inner, CircuitState::HalfOpen, now),
            _ => {}
        }
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState, now: Instant) {
        let from = inner.state;
        if from == to {
            return;
        }
        inner.state = to;
        self.new_generation(inner, now);

        match to {
            CircuitState::Open => warn!(breaker = %self.name, %from, %to, "Circuit breaker state changed"),
            _ => info!(breaker = %self.name, %from, %to, "Circuit breaker state changed"),
        }
    }

    fn new_generation(&self, inner: &mut Inner, now: Instant) {
        inner.generation = inner.generation.wrapping_add(1);
        inner.counts = Counts::default();
        // An expiry past what `Instant` can represent never fires
        inner.expiry = match inner.state {
            CircuitState::Closed => self
                .config
                .interval()
                .and_then(|interval| now.checked_add(interval)),
            CircuitState::Open => now.checked_add(self.config.open_timeout()),
            CircuitState::HalfOpen => None,
        };
    }

    /// Calls admitted while half-open; zero is read as one
    fn half_open_limit(&self) -> u32 {
        self.config.half_open_max_requests.max(1)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Ticket for a call admitted by a [`CircuitBreaker`]
#[must_use = "an admission must be finished with the call outcome"]
pub struct Admission<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    finished: bool,
}

impl Admission<'_> {
    /// Records the outcome of the admitted call
    pub fn finish(&mut self, outcome: Outcome) {
        if !self.finished {
            self.finished = true;
            self.breaker.record(self.generation, outcome);
        }
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        self.finish(Outcome::Ignored);
    }
}
