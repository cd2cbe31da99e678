//! Retrying fetcher: one upstream read with pacing, a fixed attempt budget, and error classification.

use std::future::Future;
use std::time::Duration;

use fmp_api::{Client, Query};
use rand::Rng;
use serde_json::Value;
use tokio::time::sleep;

use crate::error::UpstreamError;
use crate::rate_limiter::{Outcome, RateLimiter};

/// How the wait between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed,
    /// `delay * 2^(attempt-1)`, capped at `max_delay`, with +-20% jitter.
    Exponential,
}

impl std::str::FromStr for Backoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "exponential" | "exp" => Ok(Self::Exponential),
            other => Err(format!("unknown backoff '{}'", other)),
        }
    }
}

/// Attempt budget and backoff for upstream fetches. Fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
    pub max_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Wait before the retry that follows failed attempt number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let shift = attempt.saturating_sub(1).min(30);
                let base = self
                    .delay
                    .saturating_mul(1u32 << shift)
                    .min(self.max_delay);
                let jitter = rand::thread_rng().gen_range(0.8..1.2);
                base.mul_f64(jitter)
            }
        }
    }
}

/// Run `operation` under the limiter and retry policy.
///
/// - Calls `rate_limiter.acquire()` before each attempt.
/// - Transport failures (no response, non-2xx) are retried until
///   `max_attempts` calls have been made, then surface as
///   [`UpstreamError::Transport`].
/// - Provider errors and unparseable bodies return immediately.
/// - Counts every attempt in the limiter's [`UpstreamStats`](crate::rate_limiter::UpstreamStats).
pub async fn with_retry<T, F, Fut>(
    rate_limiter: &RateLimiter,
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, fmp_api::Error>>,
{
    let stats = rate_limiter.stats();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        rate_limiter.acquire().await;

        match operation().await {
            Ok(val) => {
                stats.record(Outcome::Succeeded);
                return Ok(val);
            }
            Err(err) if err.is_transport() && attempt < max_attempts => {
                stats.record(Outcome::Retried);
                let delay = policy.delay_for_attempt(attempt);
                stats.add_backoff(delay);
                tracing::warn!(
                    "{} request failed (attempt {}/{}): {}, retrying in {:.1}s",
                    label,
                    attempt,
                    max_attempts,
                    err,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }
            Err(err) => {
                stats.record(Outcome::Failed);
                tracing::error!("{} request failed: {}", label, err);
                return Err(classify(err, attempt));
            }
        }
    }
}

fn classify(err: fmp_api::Error, attempts: u32) -> UpstreamError {
    match err {
        fmp_api::Error::Provider(msg) => UpstreamError::Provider(msg),
        fmp_api::Error::Parse(msg) => UpstreamError::Malformed(msg),
        cause => UpstreamError::Transport { attempts, cause },
    }
}

/// The upstream client bundled with the shared limiter and retry policy.
pub struct Fetcher {
    client: Client,
    limiter: RateLimiter,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, limiter: RateLimiter, policy: RetryPolicy) -> Self {
        Self {
            client,
            limiter,
            policy,
        }
    }

    /// Fetch one endpoint and return its parsed JSON body.
    pub async fn fetch<Q: Query>(&self, query: &Q) -> Result<Value, UpstreamError> {
        let label = query.path();
        let client = &self.client;
        with_retry(&self.limiter, &self.policy, &label, move || client.get(query)).await
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
