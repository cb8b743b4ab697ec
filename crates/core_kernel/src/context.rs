//! Per-call deadline and cancellation
//!
//! Every provider operation receives a [`CallContext`]. Futures awaited
//! through [`CallContext::run`] are dropped as soon as the deadline passes or
//! the cancellation token fires, which aborts any in-flight HTTP request.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a call stopped before its future completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    /// The caller cancelled the call
    #[error("call cancelled by caller")]
    Cancelled,

    /// The call's deadline passed
    #[error("call deadline exceeded")]
    DeadlineExceeded,
}

/// Deadline, cancellation and correlation data threaded through a call
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
    correlation_id: Option<String>,
}

impl CallContext {
    /// Creates a context with no deadline and a fresh cancellation token
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Attaches a correlation id for log correlation
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the token observed by this context
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns the interruption that already applies, if any
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.cancellation.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            return Err(Interrupted::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drives `future` until it completes, the deadline passes or the call is cancelled
    ///
    /// Cancellation wins over an expired deadline when both apply.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(Interrupted::Cancelled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            output = future => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_returns_output_without_limits() {
        let ctx = CallContext::new();
        assert_eq!(ctx.run(async { 42 }).await, Ok(42));
    }

    #[tokio::test]
    async fn run_stops_at_deadline() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(20));
        let result = ctx
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert_eq!(result, Err(Interrupted::DeadlineExceeded));
    }

    #[tokio::test]
    async fn run_stops_when_cancelled() {
        let token = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let result = ctx
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        canceller.await.unwrap();
        assert_eq!(result, Err(Interrupted::Cancelled));
    }

    #[tokio::test]
    async fn already_cancelled_context_never_polls_future() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::new().with_cancellation(token);

        let mut polled = false;
        let result = ctx.run(async { polled = true }).await;
        assert_eq!(result, Err(Interrupted::Cancelled));
        assert!(!polled);
    }

    #[test]
    fn remaining_is_none_without_deadline() {
        assert!(CallContext::new().remaining().is_none());
        assert_eq!(
            CallContext::new().with_correlation_id("req-1").correlation_id(),
            Some("req-1")
        );
    }
}
