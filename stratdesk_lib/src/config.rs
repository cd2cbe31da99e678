//! Process configuration, read once from the environment at startup.

use std::time::Duration;

use fmp_api::BaseUrls;

use crate::cache::DEFAULT_CAPACITY;
use crate::fetcher::{Backoff, RetryPolicy};
use crate::rate_limiter::DEFAULT_MIN_INTERVAL;

/// Everything the service needs to talk to the upstream provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub base_urls: BaseUrls,
    pub retry: RetryPolicy,
    pub min_interval: Duration,
    pub cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: "demo".to_string(),
            base_urls: BaseUrls::default(),
            retry: RetryPolicy::default(),
            min_interval: DEFAULT_MIN_INTERVAL,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Reads `FMP_API_KEY`, `FMP_BASE_URL`, `FMP_STABLE_URL`, `FX_BASE_URL` and
    /// the `STRATDESK_*` tuning knobs. Missing or unparseable values fall back
    /// to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = match get("FMP_API_KEY") {
            Some(key) => key,
            None => {
                tracing::warn!("FMP_API_KEY is not set, falling back to the demo key");
                defaults.api_key
            }
        };

        let base_urls = BaseUrls {
            v3: get("FMP_BASE_URL").unwrap_or(defaults.base_urls.v3),
            stable: get("FMP_STABLE_URL").unwrap_or(defaults.base_urls.stable),
            fx: get("FX_BASE_URL").unwrap_or(defaults.base_urls.fx),
        };

        let retry = RetryPolicy {
            max_attempts: parsed(&get, "STRATDESK_RETRY_MAX")
                .unwrap_or(defaults.retry.max_attempts),
            delay: parsed(&get, "STRATDESK_RETRY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.delay),
            max_delay: defaults.retry.max_delay,
            backoff: parsed::<Backoff, _>(&get, "STRATDESK_RETRY_BACKOFF")
                .unwrap_or(defaults.retry.backoff),
        };

        Self {
            api_key,
            base_urls,
            retry,
            min_interval: parsed(&get, "STRATDESK_RATE_LIMIT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.min_interval),
            cache_capacity: parsed(&get, "STRATDESK_CACHE_CAPACITY")
                .unwrap_or(defaults.cache_capacity),
        }
    }
}

fn parsed<T, G>(get: &G, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.api_key, "demo");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.min_interval, Duration::from_millis(500));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("FMP_API_KEY", "secret"),
            ("FMP_BASE_URL", "http://localhost:8080/api/v3"),
            ("STRATDESK_RETRY_MAX", "2"),
            ("STRATDESK_RETRY_DELAY_MS", "250"),
            ("STRATDESK_RETRY_BACKOFF", "exponential"),
            ("STRATDESK_RATE_LIMIT_MS", "300"),
            ("STRATDESK_CACHE_CAPACITY", "16"),
        ]));
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_urls.v3, "http://localhost:8080/api/v3");
        assert_eq!(config.base_urls.stable, BaseUrls::default().stable);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.delay, Duration::from_millis(250));
        assert_eq!(config.retry.backoff, Backoff::Exponential);
        assert_eq!(config.min_interval, Duration::from_millis(300));
        assert_eq!(config.cache_capacity, 16);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("FMP_API_KEY", "   "),
            ("STRATDESK_RETRY_MAX", "many"),
            ("STRATDESK_RETRY_BACKOFF", "linear"),
        ]));
        assert_eq!(config.api_key, "demo");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff, Backoff::Fixed);
    }
}
