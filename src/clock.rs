//! Time sources for retry policies.
//!
//! Policies never call `SystemTime::now()` directly. They read time through a
//! [`Clock`] they own, which keeps deadline arithmetic deterministic under test:
//! production code uses [`SystemClock`], tests inject
//! [`FakeClock`](crate::testing::FakeClock) and advance it by hand.
//!
//! # Example
//!
//! ```rust
//! use rpc_retry::{Clock, SystemClock};
//! use std::time::SystemTime;
//!
//! let clock = SystemClock;
//! assert!(clock.now() >= SystemTime::UNIX_EPOCH);
//! ```

use std::fmt::Debug;
use std::time::SystemTime;

/// A source of the current wall-clock time.
///
/// Implementations must be cheap to clone: every policy owns its clock by value
/// and clones it whenever the policy itself is cloned. Clones of a clock should
/// observe the same timeline.
pub trait Clock: Clone + Debug + Send + Sync + 'static {
    /// Return the current point in time.
    fn now(&self) -> SystemTime;
}

/// The production clock, backed by [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
