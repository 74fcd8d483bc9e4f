//! The retry policy contract.

use std::fmt::Debug;
use std::time::SystemTime;

use crate::status::Failure;

/// Decides, after each failed attempt, whether an RPC should be retried and
/// by when the next attempt must complete.
///
/// A policy instance belongs to one logical operation. It accumulates state
/// across that operation's retry loop and is dropped when the loop ends.
/// Configuration is shared by keeping a *template* policy and calling
/// [`clone_policy`](RetryPolicy::clone_policy) once per operation.
///
/// # Protocol
///
/// 1. Obtain a private instance from the template with `clone_policy`.
/// 2. Run an attempt bounded by [`operation_deadline`](RetryPolicy::operation_deadline).
/// 3. On failure call [`on_failure`](RetryPolicy::on_failure). `false` ends the
///    loop; `true` means go back to step 2.
///
/// # Examples
///
/// ```rust
/// use rpc_retry::{LimitedErrorCountRetryPolicy, RetryPolicy, Status, StatusCode};
/// use std::time::Duration;
///
/// let template: Box<dyn RetryPolicy> =
///     Box::new(LimitedErrorCountRetryPolicy::new(2, Duration::from_millis(100)));
///
/// let mut policy = template.clone_policy();
/// let unavailable = Status::new(StatusCode::Unavailable, "try later");
///
/// assert!(policy.on_failure(&unavailable));
/// assert!(policy.on_failure(&unavailable));
/// assert!(!policy.on_failure(&unavailable));
/// assert!(policy.is_exhausted());
///
/// // The template is untouched.
/// assert!(!template.is_exhausted());
/// ```
pub trait RetryPolicy: Debug + Send + Sync {
    /// Return a new policy with the same criteria and fresh accounting.
    ///
    /// Only reads configuration, so a shared template may be cloned from many
    /// threads at once.
    fn clone_policy(&self) -> Box<dyn RetryPolicy>;

    /// Record a failed attempt and return true if the RPC should be retried.
    ///
    /// Permanent failures are never retried. This is the only operation that
    /// changes the policy's state.
    fn on_failure(&mut self, failure: &dyn Failure) -> bool;

    /// The absolute time by which the next attempt must complete.
    ///
    /// This bounds a single attempt, not the whole retry loop. Calling it any
    /// number of times has no effect on later decisions.
    fn operation_deadline(&self) -> SystemTime;

    /// Returns true once the retry budget is spent, i.e. every subsequent
    /// [`on_failure`](RetryPolicy::on_failure) will return false.
    ///
    /// Exhaustion is sticky: once true, it stays true.
    fn is_exhausted(&self) -> bool;
}

impl Clone for Box<dyn RetryPolicy> {
    fn clone(&self) -> Self {
        self.clone_policy()
    }
}

impl<P: RetryPolicy + ?Sized> RetryPolicy for Box<P> {
    fn clone_policy(&self) -> Box<dyn RetryPolicy> {
        (**self).clone_policy()
    }

    fn on_failure(&mut self, failure: &dyn Failure) -> bool {
        (**self).on_failure(failure)
    }

    fn operation_deadline(&self) -> SystemTime {
        (**self).operation_deadline()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

#[cfg(test)]
mod policy_tests {
    use super::*;
    use crate::retry::{LimitedDurationRetryPolicy, LimitedErrorCountRetryPolicy};
    use crate::testing::FakeClock;
    use crate::{Clock, Status, StatusCode};
    use std::time::Duration;

    fn transient() -> Status {
        Status::new(StatusCode::Unavailable, "try again")
    }

    #[test]
    fn test_policies_are_object_safe() {
        let clock = FakeClock::new();
        let policies: Vec<Box<dyn RetryPolicy>> = vec![
            Box::new(LimitedErrorCountRetryPolicy::with_clock(
                1,
                Duration::from_millis(10),
                clock.clone(),
            )),
            Box::new(LimitedDurationRetryPolicy::with_clock(
                Duration::from_millis(10),
                Duration::from_millis(10),
                clock.clone(),
            )),
        ];

        for mut policy in policies {
            assert!(policy.on_failure(&transient()));
        }
    }

    #[test]
    fn test_boxed_clone_resets_state() {
        let mut policy: Box<dyn RetryPolicy> =
            Box::new(LimitedErrorCountRetryPolicy::new(1, Duration::from_millis(10)));
        assert!(policy.on_failure(&transient()));
        assert!(policy.is_exhausted());

        let mut fresh = policy.clone();
        assert!(!fresh.is_exhausted());
        assert!(fresh.on_failure(&transient()));
        assert!(policy.is_exhausted());
    }

    #[test]
    fn test_box_forwards_to_inner_policy() {
        let clock = FakeClock::new();
        let inner =
            LimitedErrorCountRetryPolicy::with_clock(3, Duration::from_millis(10), clock.clone());
        let mut boxed: Box<LimitedErrorCountRetryPolicy<FakeClock>> = Box::new(inner);

        assert_eq!(
            RetryPolicy::operation_deadline(&boxed),
            clock.now() + Duration::from_millis(10)
        );
        assert!(RetryPolicy::on_failure(&mut boxed, &transient()));
        assert_eq!(boxed.failure_count(), 1);
    }
}
