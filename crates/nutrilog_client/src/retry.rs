use rand::{RngExt, rng};
use std::time::Duration;

/// Retry policy with exponential backoff and jitter, applied only to
/// idempotent remote calls. A predicate decides which errors are worth
/// another attempt; everything else fails immediately.
#[derive(Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub async fn retry_async<F, Fut, T, E, P>(&self, mut f: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries || !should_retry(&e) {
                        return Err(e);
                    }
                    // exponential backoff with jitter
                    let max_delay = self.base_delay * (1u32 << attempt);
                    let jitter = {
                        let mut rng = rng();
                        rng.random_range(0..max_delay.as_millis() as u64)
                    };
                    let delay = Duration::from_millis(jitter.min(max_delay.as_millis() as u64));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
