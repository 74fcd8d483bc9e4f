//! Deadline arithmetic shared by the retry policies.
//!
//! Configured durations are kept at millisecond granularity, and every
//! `SystemTime + Duration` in this crate goes through [`deadline_after`] so a
//! policy never panics on overflow, whatever it was configured with.

use std::time::{Duration, SystemTime};

/// Drop any sub-millisecond part of a duration.
pub(crate) fn truncate_to_millis(d: Duration) -> Duration {
    Duration::new(d.as_secs(), d.subsec_millis() * 1_000_000)
}

/// `now + d`, saturating instead of panicking when the sum is not representable.
///
/// On overflow the duration is halved until the sum fits, which lands within a
/// factor of two of the latest representable time.
pub(crate) fn deadline_after(now: SystemTime, d: Duration) -> SystemTime {
    let mut d = d;
    loop {
        if let Some(deadline) = now.checked_add(d) {
            return deadline;
        }
        d /= 2;
    }
}

#[cfg(test)]
mod time_tests {
    use super::*;

    #[test]
    fn test_truncate_to_millis() {
        assert_eq!(
            truncate_to_millis(Duration::from_micros(1_999)),
            Duration::from_millis(1)
        );
        assert_eq!(
            truncate_to_millis(Duration::new(5, 123_456_789)),
            Duration::from_millis(5_123)
        );
        assert_eq!(truncate_to_millis(Duration::from_nanos(999_999)), Duration::ZERO);
    }

    #[test]
    fn test_deadline_after_adds() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        assert_eq!(
            deadline_after(now, Duration::from_millis(250)),
            SystemTime::UNIX_EPOCH + Duration::from_millis(100_250)
        );
    }

    #[test]
    fn test_deadline_after_saturates_on_overflow() {
        let now = SystemTime::UNIX_EPOCH;
        let deadline = deadline_after(now, Duration::MAX);
        assert!(deadline > now);
    }
}
