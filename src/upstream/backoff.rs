//! Retry policy and the wait primitive used between attempts.

use std::future::Future;
use std::time::Duration;

use super::error::FetchError;

/// Upper bound on a server-provided `retry_after` hint.
const MAX_SERVER_HINT: Duration = Duration::from_secs(120);

/// Bounded exponential backoff, applied per page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Unit of the exponential series: waits are `base * 2^retry_count`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn exponential_delay(&self, retry_count: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry_count))
    }

    /// Wait before the next attempt. A rate-limit hint from the server wins
    /// over the exponential series.
    pub fn delay_for(&self, err: &FetchError, retry_count: u32) -> Duration {
        match err {
            FetchError::RateLimited {
                retry_after: Some(secs),
            } => Duration::try_from_secs_f64(*secs)
                .map(|d| d.min(MAX_SERVER_HINT))
                .unwrap_or(MAX_SERVER_HINT),
            _ => self.exponential_delay(retry_count),
        }
    }
}

/// Suspends the current task between retries.
///
/// Injected into the fetcher so tests can observe waits without sleeping.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
