//! Query functions over the upstream provider, with TTL caching and shared rate limiting.

use std::time::Duration;

use chrono::Utc;
use fmp_api::types::{ProfileRecord, QuoteRecord, SearchRecord};
use fmp_api::{BaseUrls, Client, FxQuery, ProfileQuery, QuoteQuery, SearchQuery};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::error::{StratdeskError, UpstreamError};
use crate::fetcher::{Fetcher, RetryPolicy};
use crate::history::{self, Period, SeriesRequest};
use crate::quote;
use crate::rate_limiter::{RateLimiter, StatsSnapshot};
use crate::search;
use crate::types::{Bar, ExchangeRate, HistoryResponse, Quote, SearchResponse, Source};
use crate::validation;

pub const SEARCH_TTL: Duration = Duration::from_secs(5 * 60);
pub const QUOTE_TTL: Duration = Duration::from_secs(5 * 60);
pub const HISTORY_TTL: Duration = Duration::from_secs(60 * 60);
pub const INTRADAY_CHART_TTL: Duration = Duration::from_secs(60);
pub const CHART_TTL: Duration = Duration::from_secs(5 * 60);
pub const FX_TTL: Duration = Duration::from_secs(5 * 60);

/// USD/KRW rate reported when the exchange-rate service cannot be reached.
pub const FALLBACK_USD_KRW: f64 = 1300.0;

/// Snapshot of the service's configuration and counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub api_key_configured: bool,
    pub cache_entries: usize,
    pub cache_capacity: usize,
    pub min_interval_ms: u64,
    pub max_attempts: u32,
    pub requests: StatsSnapshot,
}

/// Upstream access layer: one fetcher (client + limiter + retry policy) and one cache.
///
/// Every query normalizes its input, checks the cache, and on a miss fetches,
/// reshapes, and stores the result. Responses are tagged `cache` or `api`.
/// A failed query never writes to the cache.
pub struct MarketDataService {
    fetcher: Fetcher,
    cache: MemoryCache,
}

impl MarketDataService {
    /// Builds the service from configuration.
    pub fn new(config: &Config) -> Result<Self, fmp_api::Error> {
        let client = Client::with_base_urls(config.base_urls.clone(), &config.api_key)?;
        Ok(Self::from_parts(
            Fetcher::new(
                client,
                RateLimiter::new(config.min_interval),
                config.retry.clone(),
            ),
            MemoryCache::new(config.cache_capacity),
        ))
    }

    /// Creates a service pointing every upstream family at one server, with no
    /// pacing and a short retry delay. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self, fmp_api::Error> {
        let config = Config {
            api_key: api_key.to_string(),
            base_urls: BaseUrls::single(base_url),
            retry: RetryPolicy {
                delay: Duration::from_millis(10),
                ..RetryPolicy::default()
            },
            min_interval: Duration::ZERO,
            ..Config::default()
        };
        Self::new(&config)
    }

    pub fn from_parts(fetcher: Fetcher, cache: MemoryCache) -> Self {
        Self { fetcher, cache }
    }

    fn cached<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<Option<T>, StratdeskError> {
        match self.cache.get(key, ttl) {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .map_err(|e| StratdeskError::Cache(format!("{}: {}", key, e)))?;
                tracing::debug!("cache hit: {}", key);
                Ok(Some(value))
            }
            None => {
                tracing::debug!("cache miss: {}", key);
                Ok(None)
            }
        }
    }

    fn store<T: Serialize>(&self, key: String, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.cache.set(key, json),
            Err(e) => tracing::warn!("not caching {}: {}", key, e),
        }
    }

    /// Current quote for `symbol`, enriched with the company profile when available.
    pub async fn quote(&self, symbol: &str) -> Result<Quote, StratdeskError> {
        let symbol = validation::validate_symbol(symbol)?;
        let cache_key = format!("quote:{}", symbol);

        if let Some(mut cached) = self.cached::<Quote>(&cache_key, QUOTE_TTL)? {
            cached.source = Source::Cache;
            return Ok(cached);
        }

        let raw = self.fetcher.fetch(&QuoteQuery::new(&symbol)).await?;
        let records: Vec<QuoteRecord> = decode(raw, "quote")?;
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| StratdeskError::NotFound(format!("no quote data for {}", symbol)))?;

        let profile = self.profile(&symbol).await;
        let quote = quote::build_quote(&symbol, record, profile.as_ref(), Utc::now())?;

        self.store(cache_key, &quote);
        tracing::info!("quote {}: {} @ {}", symbol, quote.name, quote.price);
        Ok(quote)
    }

    /// Best-effort company profile. Failures only cost the extra fields.
    async fn profile(&self, symbol: &str) -> Option<ProfileRecord> {
        let raw = match self.fetcher.fetch(&ProfileQuery::new(symbol)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("profile for {} unavailable: {}", symbol, e);
                return None;
            }
        };
        match serde_json::from_value::<Vec<ProfileRecord>>(raw) {
            Ok(records) => records.into_iter().next(),
            Err(e) => {
                tracing::debug!("profile for {} unreadable: {}", symbol, e);
                None
            }
        }
    }

    /// Instruments matching a free-text query, best match first.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, StratdeskError> {
        let query = validation::validate_search(query)?;
        let cache_key = format!("search:{}", query.to_lowercase());

        if let Some(mut cached) = self.cached::<SearchResponse>(&cache_key, SEARCH_TTL)? {
            cached.query = query;
            cached.source = Source::Cache;
            return Ok(cached);
        }

        let raw = self.fetcher.fetch(&SearchQuery::new(&query)).await?;
        let records: Vec<SearchRecord> = decode(raw, "search")?;
        let (results, count) = search::reshape_search(&query, records)?;

        let response = SearchResponse {
            query,
            results,
            count,
            source: Source::Api,
        };
        if response.count > 0 {
            self.store(cache_key, &response);
        }
        tracing::info!("search '{}': {} result(s)", response.query, response.count);
        Ok(response)
    }

    /// Price history for `symbol` over `period`, newest bar first.
    pub async fn history(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<HistoryResponse, StratdeskError> {
        let symbol = validation::validate_symbol(symbol)?;
        let cache_key = format!("history:{}:{}", symbol, period);

        if let Some(mut cached) = self.cached::<HistoryResponse>(&cache_key, HISTORY_TTL)? {
            cached.source = Source::Cache;
            return Ok(cached);
        }

        let mut data = self.fetch_bars(&symbol, period).await?;
        history::sort_descending(&mut data);

        let response = HistoryResponse {
            symbol,
            period,
            count: data.len(),
            data,
            timestamp: Utc::now().to_rfc3339(),
            source: Source::Api,
        };
        self.store(cache_key, &response);
        tracing::info!(
            "history {} ({}): {} bar(s)",
            response.symbol,
            period,
            response.count
        );
        Ok(response)
    }

    /// Chart series for `symbol` over `period`, bars in upstream order.
    ///
    /// Intraday charts go stale after a minute, longer periods after five.
    pub async fn chart(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<HistoryResponse, StratdeskError> {
        let symbol = validation::validate_symbol(symbol)?;
        let cache_key = format!("chart:{}:{}", symbol, period);
        let ttl = if period.is_intraday() {
            INTRADAY_CHART_TTL
        } else {
            CHART_TTL
        };

        if let Some(mut cached) = self.cached::<HistoryResponse>(&cache_key, ttl)? {
            cached.source = Source::Cache;
            return Ok(cached);
        }

        let data = self.fetch_bars(&symbol, period).await?;
        let response = HistoryResponse {
            symbol,
            period,
            count: data.len(),
            data,
            timestamp: Utc::now().to_rfc3339(),
            source: Source::Api,
        };
        self.store(cache_key, &response);
        tracing::info!(
            "chart {} ({}): {} bar(s)",
            response.symbol,
            period,
            response.count
        );
        Ok(response)
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<Vec<Bar>, StratdeskError> {
        let today = Utc::now().date_naive();
        let raw = match history::series_request(symbol, period, today) {
            SeriesRequest::Intraday(q) => self.fetcher.fetch(&q).await?,
            SeriesRequest::Eod(q) => self.fetcher.fetch(&q).await?,
        };
        let rows = history::extract_rows(raw)?;
        history::normalize_bars(&rows)
    }

    /// USD to KRW exchange rate. Never fails: on any upstream problem it
    /// reports [`FALLBACK_USD_KRW`] tagged `default`, which is not cached.
    pub async fn exchange_rate(&self) -> ExchangeRate {
        let cache_key = "fx:USD:KRW";

        match self.cached::<ExchangeRate>(cache_key, FX_TTL) {
            Ok(Some(mut cached)) => {
                cached.source = Source::Cache;
                return cached;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match self.fetch_usd_krw().await {
            Ok(rate) => {
                let result = ExchangeRate {
                    base: "USD".to_string(),
                    quote: "KRW".to_string(),
                    rate,
                    timestamp: Utc::now().to_rfc3339(),
                    source: Source::Api,
                };
                self.store(cache_key.to_string(), &result);
                result
            }
            Err(e) => {
                tracing::warn!("exchange rate unavailable, using default: {}", e);
                ExchangeRate {
                    base: "USD".to_string(),
                    quote: "KRW".to_string(),
                    rate: FALLBACK_USD_KRW,
                    timestamp: Utc::now().to_rfc3339(),
                    source: Source::Default,
                }
            }
        }
    }

    async fn fetch_usd_krw(&self) -> Result<f64, StratdeskError> {
        let raw = self.fetcher.fetch(&FxQuery::new("USD")).await?;
        raw.get("rates")
            .and_then(|rates| rates.get("KRW"))
            .and_then(Value::as_f64)
            .ok_or_else(|| UpstreamError::Malformed("no KRW rate in response".to_string()).into())
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            api_key_configured: self.fetcher.client().has_api_key(),
            cache_entries: self.cache.len(),
            cache_capacity: self.cache.capacity(),
            min_interval_ms: self.fetcher.limiter().min_interval().as_millis() as u64,
            max_attempts: self.fetcher.policy().max_attempts,
            requests: self.fetcher.limiter().stats().snapshot(),
        }
    }

    /// Removes all entries from the cache.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Decodes an upstream payload into its record type, reporting shape
/// mismatches as malformed responses.
fn decode<T: DeserializeOwned>(raw: Value, what: &str) -> Result<T, StratdeskError> {
    serde_json::from_value(raw)
        .map_err(|e| UpstreamError::Malformed(format!("{} payload: {}", what, e)).into())
}
