//! Retry Loop Example
//!
//! Demonstrates driving the retry policies by hand and through `retry_call`:
//! - Counting failures with a limited-error-count policy
//! - Bounding a retry loop by elapsed time
//! - Stopping immediately on a permanent failure
//! - Building a template from configuration
//!
//! Run with `--features tracing` to also see each retry decision logged.

use std::time::{Duration, SystemTime};

use rpc_retry::testing::FakeClock;
use rpc_retry::{
    retry_call, Clock, LimitedDurationRetryPolicy, LimitedErrorCountRetryPolicy, RetryConfig,
    RetryPolicy, Status, StatusCode,
};

// ==================== Error Count ====================

/// Example 1: The stub owns the loop and asks the policy after each failure.
fn example_error_count() {
    println!("\n=== Example 1: Limited Error Count ===");

    let template = LimitedErrorCountRetryPolicy::new(3, Duration::from_millis(100));
    let mut policy = template.clone_policy();
    let failure = Status::new(StatusCode::Unavailable, "connection reset");

    for attempt in 1.. {
        let deadline = policy.operation_deadline();
        let budget = deadline
            .duration_since(SystemTime::now())
            .unwrap_or_default();
        println!("  Attempt {} (deadline in ~{:?})", attempt, budget);

        if !policy.on_failure(&failure) {
            println!("  Giving up after {} attempts: {}", attempt, failure);
            break;
        }
    }
}

// ==================== Duration ====================

/// Example 2: A time-bounded loop, with simulated time.
fn example_duration() {
    println!("\n=== Example 2: Limited Duration ===");

    let clock = FakeClock::new();
    let start = clock.now();
    let template = LimitedDurationRetryPolicy::with_clock(
        Duration::from_secs(5),
        Duration::from_secs(2),
        clock.clone(),
    );

    let result = retry_call(&template, |deadline| {
        let offset = deadline.duration_since(start).unwrap_or_default();
        println!("  Attempt must finish by T0+{:?}", offset);
        clock.advance(Duration::from_millis(1_500));
        Err::<(), _>(Status::new(StatusCode::DeadlineExceeded, "slow backend"))
    });

    if let Err(exhausted) = result {
        println!("  {}", exhausted);
    }
}

// ==================== Permanent Failures ====================

/// Example 3: Permanent failures end the loop regardless of budget.
fn example_permanent_failure() {
    println!("\n=== Example 3: Permanent Failure ===");

    let template = LimitedErrorCountRetryPolicy::new(10, Duration::from_millis(100));

    let result = retry_call(&template, |_| {
        Err::<(), _>(Status::new(StatusCode::PermissionDenied, "caller lacks access"))
    });

    match result {
        Ok(()) => println!("  Unexpected success"),
        Err(exhausted) => println!(
            "  Stopped after {} attempt(s), permanent = {}: {}",
            exhausted.attempts, exhausted.permanent, exhausted.final_error
        ),
    }
}

// ==================== Configuration ====================

/// Example 4: A validated template from plain configuration.
fn example_config() {
    println!("\n=== Example 4: Configuration ===");

    let config = RetryConfig::duration(Duration::from_secs(30), Duration::from_secs(5));
    match config.build() {
        Ok(template) => {
            let mut calls = 0;
            let result = retry_call(&template, |_| {
                calls += 1;
                if calls < 3 {
                    Err(Status::new(StatusCode::Aborted, "write conflict"))
                } else {
                    Ok("committed")
                }
            });
            println!("  {:?} after {} calls", result, calls);
        }
        Err(err) => println!("  Invalid configuration: {}", err),
    }

    let bad = RetryConfig::error_count(3, Duration::ZERO);
    if let Err(err) = bad.build() {
        println!("  Rejected: {}", err);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    println!("======================================");
    println!("         Retry Loop Example           ");
    println!("======================================");

    example_error_count();
    example_duration();
    example_permanent_failure();
    example_config();

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
