//! Failure classification consumed by retry policies.
//!
//! A retry policy needs exactly one fact about a failed attempt: whether the
//! failure is permanent. That capability is the [`Failure`] trait. Policies
//! never inspect status codes themselves, so any error type can drive a retry
//! loop by implementing it.
//!
//! [`Status`] is a ready-made implementation carrying a canonical RPC
//! [`StatusCode`] and a message.
//!
//! # Example
//!
//! ```rust
//! use rpc_retry::{Failure, Status, StatusCode};
//!
//! let unavailable = Status::new(StatusCode::Unavailable, "backend restarting");
//! assert!(!unavailable.is_permanent_failure());
//!
//! let not_found = Status::new(StatusCode::NotFound, "no such book");
//! assert!(not_found.is_permanent_failure());
//! ```

use std::fmt;

/// The classification a retry policy needs from a failed attempt.
pub trait Failure {
    /// Returns true if retrying cannot change the outcome.
    fn is_permanent_failure(&self) -> bool;
}

impl<T: Failure + ?Sized> Failure for &T {
    fn is_permanent_failure(&self) -> bool {
        (**self).is_permanent_failure()
    }
}

impl<T: Failure + ?Sized> Failure for Box<T> {
    fn is_permanent_failure(&self) -> bool {
        (**self).is_permanent_failure()
    }
}

/// Canonical RPC status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Not an error.
    Ok = 0,
    /// The operation was cancelled, typically by the caller.
    Cancelled = 1,
    /// Unknown error.
    Unknown = 2,
    /// The client specified an invalid argument.
    InvalidArgument = 3,
    /// The deadline expired before the operation could complete.
    DeadlineExceeded = 4,
    /// Some requested entity was not found.
    NotFound = 5,
    /// The entity a client attempted to create already exists.
    AlreadyExists = 6,
    /// The caller does not have permission to execute the operation.
    PermissionDenied = 7,
    /// Some resource has been exhausted.
    ResourceExhausted = 8,
    /// The system is not in a state required for the operation.
    FailedPrecondition = 9,
    /// The operation was aborted, typically due to a concurrency issue.
    Aborted = 10,
    /// The operation was attempted past the valid range.
    OutOfRange = 11,
    /// The operation is not implemented or supported.
    Unimplemented = 12,
    /// Internal error.
    Internal = 13,
    /// The service is currently unavailable.
    Unavailable = 14,
    /// Unrecoverable data loss or corruption.
    DataLoss = 15,
    /// The request lacks valid authentication credentials.
    Unauthenticated = 16,
}

impl StatusCode {
    /// Convert a wire value into a code. Unrecognized values map to `Unknown`.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Ok,
            1 => Self::Cancelled,
            2 => Self::Unknown,
            3 => Self::InvalidArgument,
            4 => Self::DeadlineExceeded,
            5 => Self::NotFound,
            6 => Self::AlreadyExists,
            7 => Self::PermissionDenied,
            8 => Self::ResourceExhausted,
            9 => Self::FailedPrecondition,
            10 => Self::Aborted,
            11 => Self::OutOfRange,
            12 => Self::Unimplemented,
            13 => Self::Internal,
            14 => Self::Unavailable,
            15 => Self::DataLoss,
            16 => Self::Unauthenticated,
            _ => Self::Unknown,
        }
    }

    /// The numeric wire value of this code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// The canonical upper-snake-case name of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of an RPC: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: StatusCode,
    message: String,
}

impl Status {
    /// Create a status with the given code and message.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A successful status.
    pub fn ok() -> Self {
        Self::new(StatusCode::Ok, "")
    }

    /// The status code.
    pub fn code(&self) -> StatusCode {
        self.code
    }

    /// The status message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if the code is `Ok`.
    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }

    /// Returns true for failures that may succeed if the call is repeated.
    ///
    /// Only `Aborted`, `Unavailable` and `DeadlineExceeded` are transient.
    pub fn is_transient_failure(&self) -> bool {
        matches!(
            self.code,
            StatusCode::Aborted | StatusCode::Unavailable | StatusCode::DeadlineExceeded
        )
    }

    /// Returns true for failures that will recur no matter how often the call
    /// is repeated. An `Ok` status is neither transient nor permanent.
    pub fn is_permanent_failure(&self) -> bool {
        !self.is_ok() && !self.is_transient_failure()
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

impl Failure for Status {
    fn is_permanent_failure(&self) -> bool {
        Status::is_permanent_failure(self)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for Status {}

#[cfg(test)]
mod status_tests {
    use super::*;

    #[test]
    fn test_transient_codes() {
        for code in [
            StatusCode::Aborted,
            StatusCode::Unavailable,
            StatusCode::DeadlineExceeded,
        ] {
            let status = Status::new(code, "try again");
            assert!(status.is_transient_failure(), "{code} should be transient");
            assert!(!status.is_permanent_failure());
        }
    }

    #[test]
    fn test_permanent_codes() {
        for code in [
            StatusCode::Cancelled,
            StatusCode::InvalidArgument,
            StatusCode::NotFound,
            StatusCode::PermissionDenied,
            StatusCode::Unimplemented,
            StatusCode::Internal,
            StatusCode::Unauthenticated,
        ] {
            let status = Status::new(code, "give up");
            assert!(status.is_permanent_failure(), "{code} should be permanent");
        }
    }

    #[test]
    fn test_ok_is_neither_transient_nor_permanent() {
        let status = Status::ok();
        assert!(status.is_ok());
        assert!(!status.is_transient_failure());
        assert!(!status.is_permanent_failure());
    }

    #[test]
    fn test_code_wire_values() {
        assert_eq!(StatusCode::Unavailable.as_i32(), 14);
        assert_eq!(StatusCode::from_i32(14), StatusCode::Unavailable);
        assert_eq!(StatusCode::from_i32(16), StatusCode::Unauthenticated);
        assert_eq!(StatusCode::from_i32(99), StatusCode::Unknown);
        assert_eq!(StatusCode::from_i32(-1), StatusCode::Unknown);
    }

    #[test]
    fn test_status_display() {
        let status = Status::new(StatusCode::NotFound, "shelf 7");
        assert_eq!(status.to_string(), "NOT_FOUND: shelf 7");
        assert_eq!(Status::ok().to_string(), "OK");
    }

    #[test]
    fn test_failure_forwards_through_references() {
        let status = Status::new(StatusCode::Internal, "boom");
        let by_ref: &dyn Failure = &&status;
        assert!(by_ref.is_permanent_failure());

        let boxed: Box<dyn Failure> = Box::new(Status::new(StatusCode::Unavailable, ""));
        assert!(!boxed.is_permanent_failure());
    }
}
