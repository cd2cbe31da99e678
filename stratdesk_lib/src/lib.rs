//! Library layer for Stratdesk: cached, rate-limited access to market data.
//!
//! Wraps the `fmp_api` crate with a shared request limiter, a retrying
//! fetcher, an in-memory TTL cache, input validation, and the query
//! functions that reshape upstream payloads into stable result types.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod history;
pub mod quote;
pub mod rate_limiter;
pub mod search;
pub mod service;
pub mod strategy;
pub mod types;
pub mod validation;

pub use fmp_api;

pub use cache::MemoryCache;
pub use config::Config;
pub use error::{StratdeskError, UpstreamError};
pub use fetcher::{Backoff, Fetcher, RetryPolicy};
pub use history::Period;
pub use rate_limiter::{RateLimiter, StatsSnapshot, UpstreamStats};
pub use service::{MarketDataService, ServiceStatus};
pub use strategy::{sell_strategy, SellPlan, SellStrategy};
pub use types::{Bar, ExchangeRate, HistoryResponse, Quote, SearchResponse, SearchResult, Source};
