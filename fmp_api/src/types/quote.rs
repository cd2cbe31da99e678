use serde::{Deserialize, Serialize};

/// One element of the `/quote/{symbol}` array.
///
/// Every field is optional on the wire; callers decide which ones are required.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub day_high: Option<f64>,
    #[serde(default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub year_high: Option<f64>,
    #[serde(default)]
    pub year_low: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub avg_volume: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pe: Option<f64>,
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub exchange: Option<String>,
}

/// One element of the `/profile/{symbol}` array.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange_short_name: Option<String>,
    #[serde(default)]
    pub mkt_cap: Option<f64>,
    #[serde(default)]
    pub vol_avg: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    /// 52-week range as `"low-high"`, e.g. `"164.08-199.62"`.
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProfileRecord {
    /// Parses `range` into `(low, high)`. Returns `None` when absent or malformed.
    pub fn year_range(&self) -> Option<(f64, f64)> {
        let range = self.range.as_deref()?;
        let (low, high) = range.split_once('-')?;
        Some((low.trim().parse().ok()?, high.trim().parse().ok()?))
    }
}
