//! Caller-side retry loops.
//!
//! The policies only advise; these functions own the loop. Each call clones a
//! private policy from the template, runs attempts bounded by
//! [`operation_deadline`](RetryPolicy::operation_deadline), and turns a "do not
//! retry" decision into a [`RetryExhausted`] carrying the last failure.
//!
//! No delay is inserted between attempts.

use std::time::SystemTime;

#[cfg(feature = "async")]
use std::future::Future;
#[cfg(feature = "async")]
use std::time::Duration;

use crate::retry::error::RetryExhausted;
use crate::retry::policy::RetryPolicy;
use crate::status::Failure;
#[cfg(feature = "async")]
use crate::{
    clock::{Clock, SystemClock},
    status::{Status, StatusCode},
};

/// Run `attempt` until it succeeds or the policy stops the loop.
///
/// `attempt` receives the deadline for that attempt and is responsible for
/// honoring it.
///
/// # Examples
///
/// ```rust
/// use rpc_retry::{retry_call, LimitedErrorCountRetryPolicy, Status, StatusCode};
/// use std::time::Duration;
///
/// let template = LimitedErrorCountRetryPolicy::new(5, Duration::from_millis(50));
/// let mut calls = 0;
///
/// let result = retry_call(&template, |_deadline| {
///     calls += 1;
///     if calls < 3 {
///         Err(Status::new(StatusCode::Unavailable, "warming up"))
///     } else {
///         Ok("book")
///     }
/// });
///
/// assert_eq!(result, Ok("book"));
/// assert_eq!(calls, 3);
/// ```
pub fn retry_call<P, T, E, F>(template: &P, mut attempt: F) -> Result<T, RetryExhausted<E>>
where
    P: RetryPolicy + ?Sized,
    E: Failure,
    F: FnMut(SystemTime) -> Result<T, E>,
{
    let mut policy = template.clone_policy();
    let mut attempts = 0u32;

    loop {
        let deadline = policy.operation_deadline();
        attempts = attempts.saturating_add(1);

        match attempt(deadline) {
            Ok(value) => return Ok(value),
            Err(error) => {
                if let Some(exhausted) = give_up(&mut *policy, error, attempts) {
                    return Err(exhausted);
                }
            }
        }
    }
}

/// Async counterpart of [`retry_call`], reading time from the system clock.
///
/// Each attempt is cancelled once its deadline passes. A cancelled attempt is
/// recorded as a `DeadlineExceeded` status, which is transient, so it consumes
/// retry budget like any other transient failure.
///
/// # Examples
///
/// ```rust
/// use rpc_retry::{retry_call_async, LimitedDurationRetryPolicy, Status, StatusCode};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let template = LimitedDurationRetryPolicy::new(Duration::from_secs(1), Duration::from_millis(100));
///
/// let result = retry_call_async(&template, |_deadline| async {
///     Err::<(), _>(Status::new(StatusCode::NotFound, "no such shelf"))
/// })
/// .await;
///
/// let exhausted = result.unwrap_err();
/// assert!(exhausted.permanent);
/// assert_eq!(exhausted.attempts, 1);
/// # });
/// ```
#[cfg(feature = "async")]
pub async fn retry_call_async<P, T, E, F, Fut>(
    template: &P,
    attempt: F,
) -> Result<T, RetryExhausted<E>>
where
    P: RetryPolicy + ?Sized,
    E: Failure + From<Status>,
    F: FnMut(SystemTime) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_call_async_with_clock(template, &SystemClock, attempt).await
}

/// Like [`retry_call_async`], measuring the time left before each deadline
/// with `clock`.
///
/// `clock` should be the clock the template policy reads; the attempt timeout
/// is `deadline - clock.now()`, enforced with a tokio timer.
#[cfg(feature = "async")]
pub async fn retry_call_async_with_clock<P, C, T, E, F, Fut>(
    template: &P,
    clock: &C,
    mut attempt: F,
) -> Result<T, RetryExhausted<E>>
where
    P: RetryPolicy + ?Sized,
    C: Clock,
    E: Failure + From<Status>,
    F: FnMut(SystemTime) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut policy = template.clone_policy();
    let mut attempts = 0u32;

    loop {
        let deadline = policy.operation_deadline();
        let budget = deadline
            .duration_since(clock.now())
            .unwrap_or(Duration::ZERO);
        attempts = attempts.saturating_add(1);

        let error = match tokio::time::timeout(budget, attempt(deadline)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(error)) => error,
            Err(_elapsed) => E::from(Status::new(
                StatusCode::DeadlineExceeded,
                format!("attempt {} exceeded its {:?} deadline", attempts, budget),
            )),
        };

        if let Some(exhausted) = give_up(&mut *policy, error, attempts) {
            return Err(exhausted);
        }
    }
}

/// Report a failure to the policy. Returns the terminal error if the loop
/// must stop.
fn give_up<E: Failure>(
    policy: &mut dyn RetryPolicy,
    error: E,
    attempts: u32,
) -> Option<RetryExhausted<E>> {
    if policy.on_failure(&error) {
        #[cfg(feature = "tracing")]
        tracing::debug!(attempt = attempts, "attempt failed, retrying");
        return None;
    }

    let permanent = error.is_permanent_failure();

    #[cfg(feature = "tracing")]
    tracing::debug!(attempts, permanent, "giving up");

    Some(RetryExhausted::new(error, attempts, permanent))
}
