//! Retry policies for RPC client stubs.
//!
//! A client holds one *template* policy per configured method. Each logical
//! operation clones a private instance from it and consults that instance
//! after every failed attempt:
//!
//! - **`on_failure`** decides whether to retry. Permanent failures are never
//!   retried; transient ones are retried while the budget lasts.
//! - **`operation_deadline`** says by when the next attempt must complete.
//!
//! # Strategies
//!
//! - [`LimitedErrorCountRetryPolicy`]: retry up to N transient failures
//! - [`LimitedDurationRetryPolicy`]: retry until a fixed amount of time has
//!   passed since the policy was created; attempts never outlive that deadline
//!
//! # Quick Start
//!
//! ```rust
//! use rpc_retry::{LimitedErrorCountRetryPolicy, RetryPolicy, Status, StatusCode};
//! use std::time::{Duration, SystemTime};
//!
//! let template = LimitedErrorCountRetryPolicy::new(3, Duration::from_millis(100));
//!
//! let mut policy = template.clone_policy();
//! let failure = Status::new(StatusCode::Unavailable, "connection reset");
//!
//! if policy.on_failure(&failure) {
//!     let deadline = policy.operation_deadline();
//!     assert!(deadline > SystemTime::now());
//!     // issue the next attempt with `deadline`
//! }
//! ```
//!
//! # Configuration
//!
//! [`RetryConfig`] describes a policy as plain data (serde-loadable with the
//! `serde` feature) and validates it into a template.
//!
//! # Retry Loops
//!
//! [`retry_call`] and, with the `async` feature, [`retry_call_async`] run the
//! whole loop and report a [`RetryExhausted`] carrying the last failure.

mod config;
mod duration;
mod error;
mod error_count;
mod policy;
mod run;
pub(crate) mod time;

pub use config::RetryConfig;
pub use duration::LimitedDurationRetryPolicy;
pub use error::{ConfigError, RetryExhausted};
pub use error_count::LimitedErrorCountRetryPolicy;
pub use policy::RetryPolicy;
pub use run::retry_call;
#[cfg(feature = "async")]
pub use run::{retry_call_async, retry_call_async_with_clock};
