//! Request builders for the FMP endpoints: the [`Query`] trait and one struct per endpoint.

use chrono::NaiveDate;
use url::Url;

use crate::client::Api;

/// Trait implemented by all request builders. Each query knows which API
/// family serves it, the path below that family's base URL, and its
/// query-string parameters (the API key is added by the client).
pub trait Query {
    /// The API family this endpoint lives under.
    fn api(&self) -> Api;

    /// Path relative to the API family's base URL, without a leading slash.
    fn path(&self) -> String;

    /// Query-string parameters, in the order they should be sent.
    fn params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        let params = self.params();
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &params {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

/// Real-time quote for one symbol (`/api/v3/quote/{symbol}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteQuery {
    pub symbol: String,
}

impl QuoteQuery {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
        }
    }
}

impl Query for QuoteQuery {
    fn api(&self) -> Api {
        Api::V3
    }

    fn path(&self) -> String {
        format!("quote/{}", self.symbol)
    }
}

/// Company profile for one symbol (`/api/v3/profile/{symbol}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileQuery {
    pub symbol: String,
}

impl ProfileQuery {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
        }
    }
}

impl Query for ProfileQuery {
    fn api(&self) -> Api {
        Api::V3
    }

    fn path(&self) -> String {
        format!("profile/{}", self.symbol)
    }
}

/// Free-text instrument search (`/api/v3/search?query=..&limit=..`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub limit: u32,
}

impl SearchQuery {
    /// Upstream result limit requested when none is given.
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl Query for SearchQuery {
    fn api(&self) -> Api {
        Api::V3
    }

    fn path(&self) -> String {
        "search".to_string()
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("query".to_string(), self.query.clone()),
            ("limit".to_string(), self.limit.to_string()),
        ]
    }
}

/// Fixed-interval intraday bars (`/api/v3/historical-chart/{interval}/{symbol}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntradayQuery {
    pub symbol: String,
    pub interval: String,
}

impl IntradayQuery {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            interval: "5min".to_string(),
        }
    }
}

impl Query for IntradayQuery {
    fn api(&self) -> Api {
        Api::V3
    }

    fn path(&self) -> String {
        format!("historical-chart/{}/{}", self.interval, self.symbol)
    }
}

/// Daily end-of-day bars (`/stable/historical-price-eod/full?symbol=..&from=..`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EodQuery {
    pub symbol: String,
    pub from: Option<NaiveDate>,
}

impl EodQuery {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            from: None,
        }
    }

    pub fn with_from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }
}

impl Query for EodQuery {
    fn api(&self) -> Api {
        Api::Stable
    }

    fn path(&self) -> String {
        "historical-price-eod/full".to_string()
    }

    fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("symbol".to_string(), self.symbol.clone())];
        if let Some(from) = self.from {
            params.push(("from".to_string(), from.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

/// Latest exchange rates for a base currency (`/v4/latest/{base}`), keyless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FxQuery {
    pub base: String,
}

impl FxQuery {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
        }
    }
}

impl Query for FxQuery {
    fn api(&self) -> Api {
        Api::Fx
    }

    fn path(&self) -> String {
        format!("v4/latest/{}", self.base)
    }
}
