//! Result shapes returned by the query functions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::history::Period;

/// Where a response came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Served from the TTL cache without an upstream call.
    Cache,
    /// Freshly fetched from the upstream provider.
    Api,
    /// Built-in fallback value after an upstream failure.
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cache => "cache",
            Self::Api => "api",
            Self::Default => "default",
        };
        f.write_str(s)
    }
}

/// Snapshot of one instrument's price and related metrics.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub currency: String,
    pub exchange: String,
    /// RFC 3339 time the quote was fetched.
    pub timestamp: String,
    pub source: Source,
    pub open: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub previous_close: f64,
    pub volume: i64,
    pub market_cap: Option<f64>,
    pub pe: Option<f64>,
    pub eps: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub beta: Option<f64>,
    pub avg_volume: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub currency: String,
    pub country: String,
    pub display_text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub query: String,
    /// At most ten results, best match first.
    pub results: Vec<SearchResult>,
    /// Number of matches before truncation.
    pub count: usize,
    pub source: Source,
}

/// One OHLCV record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub adj_close: f64,
}

/// Price series returned by both the history and chart queries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryResponse {
    pub symbol: String,
    pub period: Period,
    pub data: Vec<Bar>,
    pub count: usize,
    pub timestamp: String,
    pub source: Source,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExchangeRate {
    pub base: String,
    pub quote: String,
    pub rate: f64,
    pub timestamp: String,
    pub source: Source,
}
