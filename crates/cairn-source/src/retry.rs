//! Bounded retries with exponential backoff.

use std::future::Future;
use std::time::Duration;

/// Runs `op` up to `max` times, doubling `delay` between attempts. Errors
/// the predicate does not mark retryable are returned immediately.
pub async fn retry<T, E, F, Fut>(
    max: u32,
    mut delay: Duration,
    mut op: F,
    retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max = max.max(1);
    let mut last = None;
    for attempt in 0..max {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !retryable(&err) {
                    return Err(err);
                }
                last = Some(err);
            }
        }

        if attempt + 1 < max {
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
    Err(last.expect("at least one attempt was made"))
}

pub async fn retry_with_backoff<T, E, F, Fut>(op: F, retryable: impl Fn(&E) -> bool) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry(3, Duration::from_secs(1), op, retryable).await
}
