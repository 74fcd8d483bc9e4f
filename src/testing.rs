//! Testing utilities for code that drives retry policies.
//!
//! - [`FakeClock`]: a manually advanced clock for deterministic deadline tests
//! - [`assert_retries!`](crate::assert_retries) and
//!   [`assert_gives_up!`](crate::assert_gives_up): one-line checks of a
//!   policy's decision
//! - With the `proptest` feature, `Arbitrary` implementations for
//!   [`StatusCode`](crate::StatusCode) and [`Status`](crate::Status)
//!
//! # Examples
//!
//! ```rust
//! use rpc_retry::testing::FakeClock;
//! use rpc_retry::{assert_gives_up, assert_retries};
//! use rpc_retry::{LimitedDurationRetryPolicy, Status, StatusCode};
//! use std::time::Duration;
//!
//! let clock = FakeClock::new();
//! let mut policy = LimitedDurationRetryPolicy::with_clock(
//!     Duration::from_secs(1),
//!     Duration::from_millis(100),
//!     clock.clone(),
//! );
//! let unavailable = Status::new(StatusCode::Unavailable, "");
//!
//! assert_retries!(policy, &unavailable);
//! clock.advance(Duration::from_secs(1));
//! assert_gives_up!(policy, &unavailable);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::clock::Clock;
use crate::retry::time::deadline_after;

/// A clock that only moves when told to.
///
/// Clones share one timeline: advancing any handle advances every policy that
/// holds a clone. Time never moves backwards.
///
/// # Example
///
/// ```rust
/// use rpc_retry::testing::FakeClock;
/// use rpc_retry::Clock;
/// use std::time::Duration;
///
/// let clock = FakeClock::new();
/// let handle = clock.clone();
/// let start = clock.now();
///
/// handle.advance(Duration::from_millis(1_500));
/// assert_eq!(clock.now(), start + Duration::from_millis(1_500));
/// assert_eq!(clock.elapsed(), Duration::from_millis(1_500));
/// ```
#[derive(Debug, Clone)]
pub struct FakeClock {
    origin: SystemTime,
    elapsed_nanos: Arc<AtomicU64>,
}

impl FakeClock {
    /// A clock starting at a fixed instant, one million seconds after the Unix
    /// epoch, so test expectations do not depend on the real time.
    pub fn new() -> Self {
        Self::starting_at(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000))
    }

    /// A clock starting at `origin`.
    pub fn starting_at(origin: SystemTime) -> Self {
        Self {
            origin,
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward by `delta` for every clone of this clock.
    ///
    /// Near the end of `SystemTime`'s range the clock moves as far as it can
    /// and then stops.
    pub fn advance(&self, delta: Duration) {
        let nanos = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);
        let origin = self.origin;
        let _ = self
            .elapsed_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                let mut step = nanos;
                loop {
                    let next = current.saturating_add(step);
                    let fits = origin.checked_add(Duration::from_nanos(next)).is_some();
                    if fits || step == 0 {
                        return Some(next);
                    }
                    step /= 2;
                }
            });
    }

    /// Total time advanced since the clock was created.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        deadline_after(self.origin, self.elapsed())
    }
}

/// Assert that a policy retries the given failure.
///
/// Calls [`on_failure`](crate::RetryPolicy::on_failure), so the policy's state
/// advances exactly as it would in a real retry loop.
#[macro_export]
macro_rules! assert_retries {
    ($policy:expr, $failure:expr) => {
        if !$crate::RetryPolicy::on_failure(&mut $policy, $failure) {
            panic!("Expected policy to retry, but it gave up: {:?}", $policy);
        }
    };
}

/// Assert that a policy refuses to retry the given failure.
///
/// Calls [`on_failure`](crate::RetryPolicy::on_failure), so the policy's state
/// advances exactly as it would in a real retry loop.
#[macro_export]
macro_rules! assert_gives_up {
    ($policy:expr, $failure:expr) => {
        if $crate::RetryPolicy::on_failure(&mut $policy, $failure) {
            panic!("Expected policy to give up, but it retried: {:?}", $policy);
        }
    };
}

#[cfg(feature = "proptest")]
use crate::status::{Status, StatusCode};
#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for StatusCode {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (0i32..=16).prop_map(StatusCode::from_i32).boxed()
    }
}

#[cfg(feature = "proptest")]
impl Arbitrary for Status {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (any::<StatusCode>(), "[a-z ]{0,16}")
            .prop_map(|(code, message)| Status::new(code, message))
            .boxed()
    }
}
