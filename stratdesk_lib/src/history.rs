//! Price-series periods, upstream endpoint selection, and bar normalization.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use fmp_api::{EodQuery, IntradayQuery};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{StratdeskError, UpstreamError};
use crate::types::Bar;

/// Requested time span of a price series.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::OneDay,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::OneYear,
        Period::FiveYears,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }

    /// Days of end-of-day history to request. `None` means everything.
    pub fn lookback_days(&self) -> Option<i64> {
        match self {
            Self::OneDay => Some(1),
            Self::OneMonth => Some(30),
            Self::ThreeMonths => Some(90),
            Self::OneYear => Some(365),
            Self::FiveYears => Some(1825),
            Self::Max => None,
        }
    }

    /// Intraday periods are served from fixed-interval bars, not daily ones.
    pub fn is_intraday(&self) -> bool {
        matches!(self, Self::OneDay)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = StratdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                StratdeskError::InvalidInput(format!(
                    "unknown period '{}'. Valid periods: 1d, 1mo, 3mo, 1y, 5y, max",
                    s
                ))
            })
    }
}

/// The upstream request that serves a given period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesRequest {
    Intraday(IntradayQuery),
    Eod(EodQuery),
}

/// Picks the endpoint for `period`: 5-minute bars for a single day, daily
/// bars starting `lookback_days` before `today` otherwise.
pub fn series_request(symbol: &str, period: Period, today: NaiveDate) -> SeriesRequest {
    if period.is_intraday() {
        return SeriesRequest::Intraday(IntradayQuery::new(symbol));
    }
    let query = EodQuery::new(symbol);
    match period.lookback_days() {
        Some(days) => SeriesRequest::Eod(query.with_from(today - Duration::days(days))),
        None => SeriesRequest::Eod(query),
    }
}

/// Pulls the bar rows out of any of the payload layouts the provider uses:
/// a bare array, `{"historical": [...]}`, or `{"eod": [...]}`. An empty
/// object (what the provider sends for unknown symbols) yields no rows.
pub fn extract_rows(payload: Value) -> Result<Vec<Value>, StratdeskError> {
    match payload {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut obj) => {
            for key in ["historical", "eod"] {
                if let Some(Value::Array(rows)) = obj.remove(key) {
                    return Ok(rows);
                }
            }
            if obj.is_empty() || obj.keys().all(|k| k == "symbol") {
                Ok(Vec::new())
            } else {
                Err(UpstreamError::Malformed("price series without bar rows".to_string()).into())
            }
        }
        other => Err(UpstreamError::Malformed(format!(
            "unexpected price series payload: {}",
            other
        ))
        .into()),
    }
}

/// Numeric coercion: numbers pass through, numeric strings are parsed,
/// anything else (including absence) is 0.
fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalizes one upstream row. Fails when the row has no date.
pub fn normalize_bar(row: &Value) -> Result<Bar, StratdeskError> {
    let obj = row
        .as_object()
        .ok_or_else(|| UpstreamError::Malformed(format!("bar is not an object: {}", row)))?;
    let date = obj
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| UpstreamError::Malformed("bar without date".to_string()))?;

    let close = number(obj, "close").unwrap_or(0.0);
    Ok(Bar {
        date: date.to_string(),
        open: number(obj, "open").unwrap_or(0.0),
        high: number(obj, "high").unwrap_or(0.0),
        low: number(obj, "low").unwrap_or(0.0),
        close,
        volume: number(obj, "volume").unwrap_or(0.0) as i64,
        adj_close: number(obj, "adjClose")
            .or_else(|| number(obj, "adj_close"))
            .unwrap_or(close),
    })
}

/// Normalizes every row, keeping upstream order.
pub fn normalize_bars(rows: &[Value]) -> Result<Vec<Bar>, StratdeskError> {
    rows.iter().map(normalize_bar).collect()
}

/// Newest first.
pub fn sort_descending(bars: &mut [Bar]) {
    bars.sort_by(|a, b| b.date.cmp(&a.date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_parsing() {
        assert_eq!("1d".parse::<Period>().unwrap(), Period::OneDay);
        assert_eq!(" 3MO ".parse::<Period>().unwrap(), Period::ThreeMonths);
        assert_eq!("max".parse::<Period>().unwrap(), Period::Max);
        let err = "2w".parse::<Period>().unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn period_serde_matches_display() {
        for period in Period::ALL {
            let json = serde_json::to_string(&period).unwrap();
            assert_eq!(json, format!("\"{}\"", period));
        }
    }

    #[test]
    fn intraday_for_one_day() {
        let req = series_request("AAPL", Period::OneDay, day(2024, 3, 1));
        assert_eq!(req, SeriesRequest::Intraday(IntradayQuery::new("AAPL")));
    }

    #[test]
    fn eod_from_dates() {
        let today = day(2024, 3, 1);
        let cases = [
            (Period::OneMonth, Some(day(2024, 1, 31))),
            (Period::ThreeMonths, Some(day(2023, 12, 2))),
            (Period::OneYear, Some(day(2023, 3, 2))),
            (Period::FiveYears, Some(day(2019, 3, 3))),
            (Period::Max, None),
        ];
        for (period, from) in cases {
            match series_request("AAPL", period, today) {
                SeriesRequest::Eod(q) => assert_eq!(q.from, from, "period {}", period),
                other => panic!("expected eod for {}, got {:?}", period, other),
            }
        }
    }

    #[test]
    fn extract_rows_layouts() {
        assert_eq!(extract_rows(json!([{"date": "a"}])).unwrap().len(), 1);
        assert_eq!(
            extract_rows(json!({"symbol": "AAPL", "historical": [{"date": "a"}, {"date": "b"}]}))
                .unwrap()
                .len(),
            2
        );
        assert_eq!(extract_rows(json!({"eod": []})).unwrap().len(), 0);
        assert!(extract_rows(json!({})).unwrap().is_empty());
        assert!(extract_rows(json!({"unexpected": 1})).is_err());
        assert!(extract_rows(json!("nope")).is_err());
    }

    #[test]
    fn bar_coercion_and_defaults() {
        let bar = normalize_bar(&json!({
            "date": "2024-01-03",
            "open": "184.22",
            "high": 185.88,
            "close": 184.25,
            "volume": "58414500",
            "low": null
        }))
        .unwrap();
        assert_eq!(bar.open, 184.22);
        assert_eq!(bar.high, 185.88);
        assert_eq!(bar.low, 0.0);
        assert_eq!(bar.volume, 58_414_500);
        assert_eq!(bar.adj_close, 184.25);
    }

    #[test]
    fn adj_close_variants() {
        let bar = normalize_bar(&json!({"date": "d", "close": 10.0, "adjClose": 9.5})).unwrap();
        assert_eq!(bar.adj_close, 9.5);
        let bar = normalize_bar(&json!({"date": "d", "close": 10.0, "adj_close": 9.0})).unwrap();
        assert_eq!(bar.adj_close, 9.0);
    }

    #[test]
    fn bar_without_date_fails() {
        let err = normalize_bar(&json!({"close": 1.0})).unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn sorts_newest_first() {
        let mut bars =
            normalize_bars(&[json!({"date": "2024-01-02"}), json!({"date": "2024-01-03"})])
                .unwrap();
        sort_descending(&mut bars);
        let dates: Vec<_> = bars.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02"]);
    }
}
