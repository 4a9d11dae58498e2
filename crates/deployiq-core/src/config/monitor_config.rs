use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Retry policy for store writes issued by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_STORE_RETRY_ATTEMPTS,
            backoff_ms: defaults::DEFAULT_STORE_RETRY_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    /// Linear backoff before the given (1-based) retry.
    pub fn delay_for(&self, retry: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(retry)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// A resolution must be strictly above this to be applied unattended.
    pub auto_apply_confidence_threshold: f64,
    pub store_retry: RetryPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            auto_apply_confidence_threshold: defaults::DEFAULT_AUTO_APPLY_CONFIDENCE,
            store_retry: RetryPolicy::default(),
        }
    }
}
