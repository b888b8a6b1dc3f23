//! Bounded retries for model calls
//!
//! Only errors the caller marks as retryable are tried again. Anything else,
//! such as a missing key or a rejected request, is returned on the first
//! attempt.

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Delays between attempts: doubling from the base, plus up to one base of jitter
struct Backoff {
    next_ms: u64,
    jitter_ms: u64,
}

impl Backoff {
    fn new(base_ms: u64) -> Self {
        Self {
            next_ms: base_ms,
            jitter_ms: base_ms.max(1),
        }
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.next_ms + rand::random::<u64>() % self.jitter_ms;
        self.next_ms = self.next_ms.saturating_mul(2);
        Duration::from_millis(delay)
    }
}

/// Run `operation` up to `config.max_attempts` times (at least once),
/// retrying only while `retryable` accepts the error.
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    config: &RetryConfig,
    retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut backoff = Backoff::new(config.backoff_base_ms);
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !retryable(&err) {
            debug!("Attempt {} failed permanently: {}", attempt, err);
            return Err(err);
        }
        if attempt >= max_attempts {
            warn!("Giving up after {} attempts: {}", attempt, err);
            return Err(err);
        }

        let delay = backoff.next_delay();
        warn!("Attempt {} failed: {}. Retrying in {:?}", attempt, err, delay);
        sleep(delay).await;
        attempt += 1;
    }
}
