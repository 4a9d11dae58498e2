//! Bounded retry for store calls. Every write is an idempotent upsert, so
//! repeating one is safe.

use deployiq_core::config::RetryPolicy;
use deployiq_core::traits::StoreResult;

pub async fn with_retry<T, F>(policy: &RetryPolicy, operation: &str, mut call: F) -> StoreResult<T>
where
    F: FnMut() -> StoreResult<T>,
{
    let attempts = policy.max_attempts.max(1);
    let mut tried = 1;
    loop {
        match call() {
            Ok(value) => return Ok(value),
            Err(e) if tried < attempts => {
                tracing::warn!(operation, attempt = tried, error = %e, "store call failed, retrying");
                tokio::time::sleep(policy.delay_for(tried)).await;
                tried += 1;
            }
            Err(e) => {
                tracing::error!(operation, attempts, error = %e, "store call failed");
                return Err(e);
            }
        }
    }
}
