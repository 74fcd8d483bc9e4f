//! # rpc-retry
//!
//! Pluggable retry policies for RPC client stubs.
//!
//! After each failed call a client asks its policy two questions: *should I
//! retry?* and *by when must the next attempt finish?* This crate answers
//! them with two strategies sharing one object-safe [`RetryPolicy`] trait:
//!
//! - [`LimitedErrorCountRetryPolicy`] stops after a fixed number of transient
//!   failures.
//! - [`LimitedDurationRetryPolicy`] stops once a fixed time budget is spent,
//!   and never lets a single attempt run past that budget.
//!
//! Whether a failure is permanent is decided by the failure itself through the
//! [`Failure`] trait; [`Status`] is a ready-made implementation.
//!
//! ## Quick Example
//!
//! ```rust
//! use rpc_retry::{retry_call, RetryConfig, Status, StatusCode};
//! use std::time::Duration;
//!
//! // One validated template per client method.
//! let template = RetryConfig::error_count(3, Duration::from_millis(200))
//!     .build()
//!     .unwrap();
//!
//! let mut calls = 0;
//! let result = retry_call(&template, |deadline| {
//!     calls += 1;
//!     // a real stub would send the request with `deadline` here
//!     let _ = deadline;
//!     if calls == 1 {
//!         Err(Status::new(StatusCode::Unavailable, "connection reset"))
//!     } else {
//!         Ok("shelf-42")
//!     }
//! });
//!
//! assert_eq!(result.unwrap(), "shelf-42");
//! ```
//!
//! ## Features
//!
//! - `async`: [`retry_call_async`] with per-attempt timeouts on tokio
//! - `tracing`: retry decisions are logged through `tracing`
//! - `serde`: [`RetryConfig`] implements `Serialize`/`Deserialize`
//! - `proptest`: `Arbitrary` for [`Status`] and [`StatusCode`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod clock;
pub mod retry;
pub mod status;
pub mod testing;

// Re-exports
pub use clock::{Clock, SystemClock};
pub use retry::{
    retry_call, ConfigError, LimitedDurationRetryPolicy, LimitedErrorCountRetryPolicy,
    RetryConfig, RetryExhausted, RetryPolicy,
};
#[cfg(feature = "async")]
pub use retry::{retry_call_async, retry_call_async_with_clock};
pub use status::{Failure, Status, StatusCode};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::retry::{
        retry_call, LimitedDurationRetryPolicy, LimitedErrorCountRetryPolicy, RetryConfig,
        RetryExhausted, RetryPolicy,
    };
    pub use crate::status::{Failure, Status, StatusCode};
}
