//! Async Retry Loop Example
//!
//! Demonstrates `retry_call_async`, which cancels attempts that outlive the
//! deadline handed out by the policy.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rpc_retry::{retry_call_async, LimitedDurationRetryPolicy, Status, StatusCode};

#[tokio::main]
async fn main() {
    println!("=== Async Retry Loop ===");

    let template = LimitedDurationRetryPolicy::new(Duration::from_secs(2), Duration::from_millis(200));
    let attempts = Arc::new(AtomicU32::new(0));

    let result = retry_call_async(&template, |deadline| {
        let attempts = attempts.clone();
        async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            println!("  Attempt {} (deadline {:?})", n + 1, deadline);
            match n {
                // Too slow: cancelled at the deadline and retried.
                0 => {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    Ok("late")
                }
                1 => Err(Status::new(StatusCode::Unavailable, "backend restarting")),
                _ => Ok("shelf-42"),
            }
        }
    })
    .await;

    match result {
        Ok(value) => println!("Success after {} attempts: {}", attempts.load(Ordering::SeqCst), value),
        Err(exhausted) => println!("Failed: {}", exhausted),
    }
}
