//! Retry until a fixed number of transient failures has been seen.

use std::time::{Duration, SystemTime};

use crate::clock::{Clock, SystemClock};
use crate::retry::policy::RetryPolicy;
use crate::retry::time::{deadline_after, truncate_to_millis};
use crate::status::Failure;

/// A "count errors and then stop" retry policy.
///
/// With `max_failures = N`, the first `N` transient failures are retried and
/// the `N + 1`-th is not. Every call to [`on_failure`](RetryPolicy::on_failure)
/// advances the failure counter by one, including calls reporting a permanent
/// failure.
///
/// Each attempt is given `rpc_duration` (truncated to whole milliseconds) from
/// the moment its deadline is requested.
///
/// Cloning produces a policy with the same configuration and a zeroed counter.
///
/// # Examples
///
/// ```rust
/// use rpc_retry::{LimitedErrorCountRetryPolicy, RetryPolicy, Status, StatusCode};
/// use std::time::Duration;
///
/// let mut policy = LimitedErrorCountRetryPolicy::new(3, Duration::from_millis(100));
/// let unavailable = Status::new(StatusCode::Unavailable, "try later");
///
/// assert!(policy.on_failure(&unavailable));
/// assert!(policy.on_failure(&unavailable));
/// assert!(policy.on_failure(&unavailable));
/// assert!(!policy.on_failure(&unavailable));
/// assert_eq!(policy.failure_count(), 4);
/// ```
#[derive(Debug)]
pub struct LimitedErrorCountRetryPolicy<C: Clock = SystemClock> {
    clock: C,
    rpc_duration: Duration,
    failure_count: u32,
    max_failures: u32,
}

impl LimitedErrorCountRetryPolicy<SystemClock> {
    /// Create a policy that tolerates `max_failures` transient failures, using
    /// the system clock.
    pub fn new(max_failures: u32, rpc_duration: Duration) -> Self {
        Self::with_clock(max_failures, rpc_duration, SystemClock)
    }
}

impl<C: Clock> LimitedErrorCountRetryPolicy<C> {
    /// Create a policy that reads time from `clock`.
    pub fn with_clock(max_failures: u32, rpc_duration: Duration, clock: C) -> Self {
        Self {
            clock,
            rpc_duration: truncate_to_millis(rpc_duration),
            failure_count: 0,
            max_failures,
        }
    }

    /// The number of transient failures that will be retried.
    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }

    /// How many failures have been reported so far.
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// The time allowed for each attempt.
    pub fn rpc_duration(&self) -> Duration {
        self.rpc_duration
    }

    /// The clock this policy reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> Clone for LimitedErrorCountRetryPolicy<C> {
    /// Copies the configuration. The failure counter starts again at zero.
    fn clone(&self) -> Self {
        Self::with_clock(self.max_failures, self.rpc_duration, self.clock.clone())
    }
}

impl<C: Clock> RetryPolicy for LimitedErrorCountRetryPolicy<C> {
    fn clone_policy(&self) -> Box<dyn RetryPolicy> {
        Box::new(self.clone())
    }

    /// Permanent failures are counted before the short-circuit, so they use
    /// up budget even though they are never retried.
    fn on_failure(&mut self, failure: &dyn Failure) -> bool {
        let previous = self.failure_count;
        self.failure_count = previous.saturating_add(1);

        if failure.is_permanent_failure() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                failure_count = self.failure_count,
                "permanent failure, not retrying"
            );
            return false;
        }

        let retry = previous < self.max_failures;

        #[cfg(feature = "tracing")]
        log_decision(self.failure_count, self.max_failures, retry);

        retry
    }

    fn operation_deadline(&self) -> SystemTime {
        deadline_after(self.clock.now(), self.rpc_duration)
    }

    fn is_exhausted(&self) -> bool {
        self.failure_count >= self.max_failures
    }
}

#[cfg(feature = "tracing")]
fn log_decision(failure_count: u32, max_failures: u32, retry: bool) {
    if retry {
        tracing::trace!(failure_count, max_failures, "transient failure, retrying");
    } else {
        tracing::debug!(failure_count, max_failures, "retry budget exhausted");
    }
}
