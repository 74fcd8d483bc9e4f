//! Declarative retry configuration.
//!
//! [`RetryConfig`] is plain data describing which policy to build. Client
//! configuration typically holds one, validates it once with
//! [`build`](RetryConfig::build), and keeps the resulting template policy to
//! clone per operation.
//!
//! With the `serde` feature enabled the config can be loaded from any serde
//! format. Durations are written as integer milliseconds:
//!
//! ```json
//! { "kind": "duration", "max_duration_ms": 30000, "rpc_duration_ms": 5000 }
//! ```

use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::retry::duration::LimitedDurationRetryPolicy;
use crate::retry::error::ConfigError;
use crate::retry::error_count::LimitedErrorCountRetryPolicy;
use crate::retry::policy::RetryPolicy;
use crate::retry::time::truncate_to_millis;

/// Which retry policy to build, and with what limits.
///
/// # Examples
///
/// ```rust
/// use rpc_retry::{RetryConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let config = RetryConfig::duration(Duration::from_secs(30), Duration::from_secs(5));
/// let template = config.build().unwrap();
///
/// let policy = template.clone_policy();
/// assert!(!policy.is_exhausted());
///
/// // A per-attempt duration under one millisecond is rejected.
/// let bad = RetryConfig::error_count(3, Duration::from_micros(10));
/// assert!(bad.build().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum RetryConfig {
    /// Build a [`LimitedErrorCountRetryPolicy`].
    ErrorCount {
        /// Number of transient failures to retry.
        max_failures: u32,
        /// Time allowed for each attempt.
        #[cfg_attr(feature = "serde", serde(rename = "rpc_duration_ms", with = "millis"))]
        rpc_duration: Duration,
    },
    /// Build a [`LimitedDurationRetryPolicy`].
    Duration {
        /// Total time budget for the retry loop.
        #[cfg_attr(feature = "serde", serde(rename = "max_duration_ms", with = "millis"))]
        max_duration: Duration,
        /// Time allowed for each attempt.
        #[cfg_attr(feature = "serde", serde(rename = "rpc_duration_ms", with = "millis"))]
        rpc_duration: Duration,
    },
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::ErrorCount {
            max_failures: 3,
            rpc_duration: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Configure a failure-count-limited policy.
    pub fn error_count(max_failures: u32, rpc_duration: Duration) -> Self {
        Self::ErrorCount {
            max_failures,
            rpc_duration,
        }
    }

    /// Configure an elapsed-time-limited policy.
    pub fn duration(max_duration: Duration, rpc_duration: Duration) -> Self {
        Self::Duration {
            max_duration,
            rpc_duration,
        }
    }

    /// The per-attempt duration, whichever policy is configured.
    pub fn rpc_duration(&self) -> Duration {
        match self {
            Self::ErrorCount { rpc_duration, .. }
            | Self::Duration { rpc_duration, .. } => *rpc_duration,
        }
    }

    /// Check the configuration without building a policy.
    ///
    /// A zero retry budget (`max_failures = 0` or `max_duration = 0`) is valid
    /// and means "never retry". A per-attempt duration that truncates to zero
    /// milliseconds is not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rpc_duration = self.rpc_duration();
        if truncate_to_millis(rpc_duration).is_zero() {
            return Err(ConfigError::ZeroRpcDuration { rpc_duration });
        }
        Ok(())
    }

    /// Validate and build a policy reading the system clock.
    pub fn build(&self) -> Result<Box<dyn RetryPolicy>, ConfigError> {
        self.build_with_clock(SystemClock)
    }

    /// Validate and build a policy reading `clock`.
    pub fn build_with_clock<C: Clock>(&self, clock: C) -> Result<Box<dyn RetryPolicy>, ConfigError> {
        self.validate()?;

        let policy: Box<dyn RetryPolicy> = match *self {
            Self::ErrorCount {
                max_failures,
                rpc_duration,
            } => Box::new(LimitedErrorCountRetryPolicy::with_clock(
                max_failures,
                rpc_duration,
                clock,
            )),
            Self::Duration {
                max_duration,
                rpc_duration,
            } => Box::new(LimitedDurationRetryPolicy::with_clock(
                max_duration,
                rpc_duration,
                clock,
            )),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(config = ?self, "built retry policy");

        Ok(policy)
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
