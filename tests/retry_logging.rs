//! Retry decisions are visible through `tracing`.

use rpc_retry::testing::FakeClock;
use rpc_retry::{
    retry_call, LimitedDurationRetryPolicy, LimitedErrorCountRetryPolicy, RetryPolicy, Status,
    StatusCode,
};
use std::time::Duration;
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_exhaustion_is_logged() {
    let mut policy =
        LimitedErrorCountRetryPolicy::with_clock(1, Duration::from_millis(10), FakeClock::new());
    let status = Status::new(StatusCode::Unavailable, "down");

    assert!(policy.on_failure(&status));
    assert!(!policy.on_failure(&status));

    assert!(logs_contain("retry budget exhausted"));
}

#[traced_test]
#[test]
fn test_permanent_failure_is_logged() {
    let mut policy = LimitedDurationRetryPolicy::with_clock(
        Duration::from_secs(1),
        Duration::from_millis(10),
        FakeClock::new(),
    );

    assert!(!policy.on_failure(&Status::new(StatusCode::NotFound, "missing")));

    assert!(logs_contain("permanent failure, not retrying"));
}

#[traced_test]
#[test]
fn test_retry_loop_logs_give_up() {
    let template = LimitedErrorCountRetryPolicy::new(2, Duration::from_millis(10));

    let result = retry_call(&template, |_| {
        Err::<(), _>(Status::new(StatusCode::Aborted, "conflict"))
    });

    assert_eq!(result.unwrap_err().attempts, 3);
    assert!(logs_contain("attempt failed, retrying"));
    assert!(logs_contain("giving up"));
}
