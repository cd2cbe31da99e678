//! Minimum-spacing rate limiter shared by every upstream request, plus outcome counters.
//!
//! One limiter instance lives in the service, so the cap applies to the total
//! upstream call rate across all query kinds rather than per endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Default spacing between consecutive upstream requests.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Enforces a minimum interval between consecutive `acquire()` returns.
///
/// The timestamp sits behind a tokio Mutex that is held across the wait, so
/// concurrent callers queue up and each one leaves at least `min_interval`
/// after the previous one.
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
    stats: UpstreamStats,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
            stats: UpstreamStats::default(),
        }
    }

    /// Wait until `min_interval` has passed since the previous acquire, then
    /// record now as the new baseline. Returns immediately on first use or
    /// when the interval has already elapsed.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if ready_at > Instant::now() {
                sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Attempt counters for everything that went through this limiter.
    pub fn stats(&self) -> &UpstreamStats {
        &self.stats
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

/// How one upstream attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// Transport failure with attempts left in the budget.
    Retried,
    /// Permanent error, or the last attempt in the budget failed.
    Failed,
}

/// Running totals of upstream attempts, shared by every query kind.
#[derive(Default)]
pub struct UpstreamStats {
    attempts: AtomicU64,
    succeeded: AtomicU64,
    retried: AtomicU64,
    failed: AtomicU64,
    backoff_ms: AtomicU64,
}

impl UpstreamStats {
    pub fn record(&self, outcome: Outcome) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            Outcome::Succeeded => &self.succeeded,
            Outcome::Retried => &self.retried,
            Outcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_backoff(&self, wait: Duration) {
        let ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        self.backoff_ms.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            retried: self.retried.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            backoff_secs: Duration::from_millis(self.backoff_ms.load(Ordering::Relaxed))
                .as_secs_f64(),
        }
    }
}

/// Point-in-time copy of [`UpstreamStats`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Every request sent upstream, retries included.
    pub attempts: u64,
    pub succeeded: u64,
    pub retried: u64,
    pub failed: u64,
    /// Total time spent sleeping between retries.
    pub backoff_secs: f64,
}
