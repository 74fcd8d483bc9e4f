//! Retry until a fixed amount of wall-clock time has elapsed.

use std::time::{Duration, SystemTime};

use crate::clock::{Clock, SystemClock};
use crate::retry::policy::RetryPolicy;
use crate::retry::time::{deadline_after, truncate_to_millis};
use crate::status::Failure;

/// A "keep trying for this long" retry policy.
///
/// The overall deadline is fixed when the policy is created: creation time plus
/// `max_duration`. Transient failures are retried while the clock reads strictly
/// earlier than that deadline. Each attempt gets `rpc_duration`, but never runs
/// past the overall deadline.
///
/// Cloning produces a policy with the same configuration and a *new* overall
/// deadline computed from the clock at clone time. A template cloned per
/// operation therefore gives every operation the full `max_duration`.
///
/// # Examples
///
/// ```rust
/// use rpc_retry::testing::FakeClock;
/// use rpc_retry::{Clock, LimitedDurationRetryPolicy, RetryPolicy, Status, StatusCode};
/// use std::time::Duration;
///
/// let clock = FakeClock::new();
/// let start = clock.now();
/// let mut policy = LimitedDurationRetryPolicy::with_clock(
///     Duration::from_secs(5),
///     Duration::from_secs(1),
///     clock.clone(),
/// );
/// let unavailable = Status::new(StatusCode::Unavailable, "try later");
///
/// clock.advance(Duration::from_millis(4_900));
/// assert!(policy.on_failure(&unavailable));
/// assert_eq!(policy.operation_deadline(), start + Duration::from_secs(5));
///
/// clock.advance(Duration::from_millis(200));
/// assert!(!policy.on_failure(&unavailable));
/// ```
#[derive(Debug)]
pub struct LimitedDurationRetryPolicy<C: Clock = SystemClock> {
    clock: C,
    rpc_duration: Duration,
    max_duration: Duration,
    deadline: SystemTime,
}

impl LimitedDurationRetryPolicy<SystemClock> {
    /// Create a policy that retries for `max_duration`, using the system clock.
    pub fn new(max_duration: Duration, rpc_duration: Duration) -> Self {
        Self::with_clock(max_duration, rpc_duration, SystemClock)
    }
}

impl<C: Clock> LimitedDurationRetryPolicy<C> {
    /// Create a policy that reads time from `clock`. The overall deadline is
    /// computed from the clock's current reading.
    pub fn with_clock(max_duration: Duration, rpc_duration: Duration, clock: C) -> Self {
        let max_duration = truncate_to_millis(max_duration);
        let deadline = deadline_after(clock.now(), max_duration);
        Self {
            clock,
            rpc_duration: truncate_to_millis(rpc_duration),
            max_duration,
            deadline,
        }
    }

    /// The total time budget, measured from creation.
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// The time allowed for each attempt.
    pub fn rpc_duration(&self) -> Duration {
        self.rpc_duration
    }

    /// The instant after which failures are no longer retried.
    pub fn deadline(&self) -> SystemTime {
        self.deadline
    }

    /// Time left before the overall deadline, or zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline
            .duration_since(self.clock.now())
            .unwrap_or(Duration::ZERO)
    }

    /// The clock this policy reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> Clone for LimitedDurationRetryPolicy<C> {
    /// Copies the configuration and restarts the time budget from now.
    fn clone(&self) -> Self {
        Self::with_clock(self.max_duration, self.rpc_duration, self.clock.clone())
    }
}

impl<C: Clock> RetryPolicy for LimitedDurationRetryPolicy<C> {
    fn clone_policy(&self) -> Box<dyn RetryPolicy> {
        Box::new(self.clone())
    }

    fn on_failure(&mut self, failure: &dyn Failure) -> bool {
        if failure.is_permanent_failure() {
            #[cfg(feature = "tracing")]
            tracing::debug!("permanent failure, not retrying");
            return false;
        }

        let now = self.clock.now();
        let retry = now < self.deadline;

        #[cfg(feature = "tracing")]
        log_decision(self.deadline, now, retry);

        retry
    }

    fn operation_deadline(&self) -> SystemTime {
        let attempt_deadline = deadline_after(self.clock.now(), self.rpc_duration);
        attempt_deadline.min(self.deadline)
    }

    fn is_exhausted(&self) -> bool {
        self.clock.now() >= self.deadline
    }
}

#[cfg(feature = "tracing")]
fn log_decision(deadline: SystemTime, now: SystemTime, retry: bool) {
    if retry {
        let remaining = deadline.duration_since(now).unwrap_or(Duration::ZERO);
        tracing::trace!(?remaining, "transient failure, retrying");
    } else {
        let overdue = now.duration_since(deadline).unwrap_or(Duration::ZERO);
        tracing::debug!(?overdue, "retry budget exhausted");
    }
}

#[cfg(test)]
mod duration_tests {
    use super::*;
    use crate::testing::FakeClock;
    use crate::{Status, StatusCode};

    fn transient() -> Status {
        Status::new(StatusCode::DeadlineExceeded, "slow backend")
    }

    fn permanent() -> Status {
        Status::new(StatusCode::InvalidArgument, "bad request")
    }

    fn policy(
        max_duration: Duration,
        rpc_duration: Duration,
    ) -> (LimitedDurationRetryPolicy<FakeClock>, FakeClock) {
        let clock = FakeClock::new();
        let policy =
            LimitedDurationRetryPolicy::with_clock(max_duration, rpc_duration, clock.clone());
        (policy, clock)
    }

    #[test]
    fn test_retries_until_deadline() {
        let (mut policy, clock) = policy(Duration::from_secs(5), Duration::from_secs(1));
        let start = clock.now();
        assert_eq!(policy.deadline(), start + Duration::from_secs(5));

        assert!(policy.on_failure(&transient()));
        clock.advance(Duration::from_millis(4_999));
        assert!(policy.on_failure(&transient()));

        clock.advance(Duration::from_millis(1));
        assert!(!policy.on_failure(&transient()));
        assert!(policy.is_exhausted());

        clock.advance(Duration::from_secs(60));
        assert!(!policy.on_failure(&transient()));
    }

    #[test]
    fn test_on_failure_does_not_change_state() {
        let (mut policy, _) = policy(Duration::from_secs(5), Duration::from_secs(1));
        let deadline = policy.deadline();
        for _ in 0..100 {
            assert!(policy.on_failure(&transient()));
        }
        assert_eq!(policy.deadline(), deadline);
        assert!(!policy.is_exhausted());
    }

    #[test]
    fn test_permanent_failure_not_retried_with_time_left() {
        let (mut policy, _) = policy(Duration::from_secs(5), Duration::from_secs(1));
        assert!(!policy.on_failure(&permanent()));
        assert!(!policy.is_exhausted());
        assert!(policy.on_failure(&transient()));
    }

    #[test]
    fn test_operation_deadline_capped_by_overall_deadline() {
        let (policy, clock) = policy(Duration::from_secs(5), Duration::from_secs(1));
        let start = clock.now();

        assert_eq!(policy.operation_deadline(), start + Duration::from_secs(1));

        clock.advance(Duration::from_millis(4_900));
        assert_eq!(policy.operation_deadline(), start + Duration::from_secs(5));

        clock.advance(Duration::from_secs(10));
        assert_eq!(policy.operation_deadline(), start + Duration::from_secs(5));
    }

    #[test]
    fn test_zero_max_duration_never_retries() {
        let (mut policy, _) = policy(Duration::ZERO, Duration::from_secs(1));
        assert!(policy.is_exhausted());
        assert!(!policy.on_failure(&transient()));
        assert_eq!(policy.operation_deadline(), policy.deadline());
    }

    #[test]
    fn test_remaining() {
        let (policy, clock) = policy(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(policy.remaining(), Duration::from_secs(5));
        clock.advance(Duration::from_secs(2));
        assert_eq!(policy.remaining(), Duration::from_secs(3));
        clock.advance(Duration::from_secs(10));
        assert_eq!(policy.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_clone_gets_fresh_full_window() {
        let (mut policy, clock) = policy(Duration::from_secs(5), Duration::from_secs(1));
        let start = clock.now();

        clock.advance(Duration::from_secs(4));
        let mut clone = policy.clone();

        // The clone's window starts at clone time, not at the source's creation.
        assert_eq!(clone.deadline(), start + Duration::from_secs(9));
        assert_eq!(clone.max_duration(), Duration::from_secs(5));
        assert_eq!(clone.rpc_duration(), Duration::from_secs(1));

        clock.advance(Duration::from_secs(2));
        assert!(!policy.on_failure(&transient()));
        assert!(clone.on_failure(&transient()));
        assert_eq!(policy.deadline(), start + Duration::from_secs(5));
    }

    #[test]
    fn test_durations_truncated_to_millis() {
        let (policy, clock) = policy(Duration::from_micros(5_900), Duration::from_micros(1_100));
        assert_eq!(policy.max_duration(), Duration::from_millis(5));
        assert_eq!(policy.rpc_duration(), Duration::from_millis(1));
        assert_eq!(policy.deadline(), clock.now() + Duration::from_millis(5));
    }

    #[test]
    fn test_huge_max_duration_does_not_panic() {
        let mut policy = LimitedDurationRetryPolicy::new(Duration::MAX, Duration::MAX);
        assert!(policy.on_failure(&transient()));
        assert!(policy.operation_deadline() <= policy.deadline());
    }
}
