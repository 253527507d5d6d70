use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use cairn_source::retry::{retry, retry_with_backoff};

#[derive(Debug, PartialEq)]
enum FakeError {
    Transient,
    Permanent,
}

fn is_transient(err: &FakeError) -> bool {
    *err == FakeError::Transient
}

#[tokio::test]
async fn first_success_short_circuits() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry(
        3,
        Duration::from_millis(1),
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(7) }
        },
        is_transient,
    )
    .await;

    assert_eq!(result, Ok(7));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_errors_are_retried() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry(
        3,
        Duration::from_millis(1),
        || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(FakeError::Transient)
                } else {
                    Ok(42)
                }
            }
        },
        is_transient,
    )
    .await;

    assert_eq!(result, Ok(42));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn permanent_errors_fail_fast() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry(
        5,
        Duration::from_millis(1),
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::Permanent) }
        },
        is_transient,
    )
    .await;

    assert_eq!(result, Err(FakeError::Permanent));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn attempts_are_bounded() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry(
        3,
        Duration::from_millis(1),
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::Transient) }
        },
        is_transient,
    )
    .await;

    assert_eq!(result, Err(FakeError::Transient));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn zero_max_still_tries_once() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry(
        0,
        Duration::from_millis(1),
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        },
        is_transient,
    )
    .await;

    assert_eq!(result, Ok(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn default_backoff_retries_transients() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry_with_backoff(
        || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(FakeError::Transient)
                } else {
                    Ok(9)
                }
            }
        },
        is_transient,
    )
    .await;

    assert_eq!(result, Ok(9));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
