//! Error types for retry loops and retry configuration.

use std::fmt;
use std::time::Duration;

/// Error returned when a retry loop gives up.
///
/// Carries the failure from the last attempt, so callers can surface the
/// status that actually ended the loop.
///
/// # Examples
///
/// ```rust
/// use rpc_retry::{retry_call, LimitedErrorCountRetryPolicy, Status, StatusCode};
/// use std::time::Duration;
///
/// let template = LimitedErrorCountRetryPolicy::new(2, Duration::from_millis(50));
///
/// let result = retry_call(&template, |_deadline| {
///     Err::<(), _>(Status::new(StatusCode::Unavailable, "still down"))
/// });
///
/// let exhausted = result.unwrap_err();
/// assert_eq!(exhausted.attempts, 3); // 1 initial + 2 retries
/// assert!(!exhausted.permanent);
/// assert_eq!(exhausted.final_error.message(), "still down");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// The failure from the final attempt.
    pub final_error: E,
    /// Total number of attempts made (initial + retries).
    pub attempts: u32,
    /// True if the loop stopped on a permanent failure rather than an
    /// exhausted budget.
    pub permanent: bool,
}

impl<E> RetryExhausted<E> {
    /// Create a new RetryExhausted error.
    pub fn new(final_error: E, attempts: u32, permanent: bool) -> Self {
        Self {
            final_error,
            attempts,
            permanent,
        }
    }

    /// Extract the final error, discarding metadata.
    pub fn into_error(self) -> E {
        self.final_error
    }

    /// Get a reference to the final error.
    pub fn error(&self) -> &E {
        &self.final_error
    }
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.permanent {
            write!(
                f,
                "permanent failure after {} attempts: {}",
                self.attempts, self.final_error
            )
        } else {
            write!(
                f,
                "retry exhausted after {} attempts: {}",
                self.attempts, self.final_error
            )
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.final_error)
    }
}

/// Error returned when a [`RetryConfig`](crate::RetryConfig) cannot produce a
/// policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The per-attempt duration is shorter than one millisecond.
    ZeroRpcDuration {
        /// The rejected duration, before truncation.
        rpc_duration: Duration,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRpcDuration { rpc_duration } => write!(
                f,
                "rpc duration must be at least 1ms, got {:?}",
                rpc_duration
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod error_tests {
    use super::*;
    use crate::{Status, StatusCode};

    #[test]
    fn test_retry_exhausted_display() {
        let err = RetryExhausted::new("connection failed", 3, false);
        let display = format!("{}", err);
        assert!(display.contains("retry exhausted"));
        assert!(display.contains("3 attempts"));
        assert!(display.contains("connection failed"));
    }

    #[test]
    fn test_retry_exhausted_display_permanent() {
        let err = RetryExhausted::new(Status::new(StatusCode::NotFound, "gone"), 1, true);
        assert_eq!(
            err.to_string(),
            "permanent failure after 1 attempts: NOT_FOUND: gone"
        );
    }

    #[test]
    fn test_retry_exhausted_into_error() {
        let err = RetryExhausted::new("test error", 5, false);
        assert_eq!(err.error(), &"test error");
        assert_eq!(err.into_error(), "test error");
    }

    #[test]
    fn test_retry_exhausted_source_is_final_error() {
        use std::error::Error;

        let err = RetryExhausted::new(Status::new(StatusCode::Unavailable, "down"), 4, false);
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("UNAVAILABLE: down"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ZeroRpcDuration {
            rpc_duration: Duration::from_micros(10),
        };
        assert!(err.to_string().contains("at least 1ms"));
    }
}
