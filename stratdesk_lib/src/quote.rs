//! Quote reshaping: derive change figures and merge optional profile details.

use chrono::{DateTime, Utc};
use fmp_api::types::{ProfileRecord, QuoteRecord};

use crate::error::{StratdeskError, UpstreamError};
use crate::types::{Quote, Source};

/// Longest description kept from the company profile, in characters.
const DESCRIPTION_LIMIT: usize = 200;

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Returns `(change, change_percent)`, both rounded to two decimals.
///
/// A missing previous close counts as unchanged. A zero previous close
/// yields a percentage of 0.
pub fn derive_change(price: f64, previous_close: Option<f64>) -> (f64, f64) {
    let previous = previous_close.unwrap_or(price);
    let change = price - previous;
    let percent = if previous != 0.0 {
        change / previous * 100.0
    } else {
        0.0
    };
    (round2(change), round2(percent))
}

fn truncate_description(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let head: String = text.chars().take(DESCRIPTION_LIMIT).collect();
    format!("{}...", head)
}

/// Builds a [`Quote`] from the first upstream record and an optional profile.
///
/// Fails with `Malformed` when the record has no price.
pub fn build_quote(
    symbol: &str,
    record: QuoteRecord,
    profile: Option<&ProfileRecord>,
    now: DateTime<Utc>,
) -> Result<Quote, StratdeskError> {
    let price = record.price.ok_or_else(|| {
        UpstreamError::Malformed(format!("quote for {} has no price", symbol))
    })?;
    let (change, change_percent) = derive_change(price, record.previous_close);
    let profile = profile.cloned().unwrap_or_default();
    let year_range = profile.year_range();

    Ok(Quote {
        symbol: symbol.to_string(),
        name: profile
            .company_name
            .or(record.name)
            .unwrap_or_else(|| symbol.to_string()),
        price,
        change,
        change_percent,
        currency: profile.currency.unwrap_or_else(|| "USD".to_string()),
        exchange: profile
            .exchange_short_name
            .or(record.exchange)
            .unwrap_or_else(|| "US Market".to_string()),
        timestamp: now.to_rfc3339(),
        source: Source::Api,
        open: record.open.unwrap_or(0.0),
        day_high: record.day_high.unwrap_or(0.0),
        day_low: record.day_low.unwrap_or(0.0),
        previous_close: record.previous_close.unwrap_or(price),
        volume: record.volume.unwrap_or(0.0) as i64,
        market_cap: profile.mkt_cap.or(record.market_cap),
        pe: record.pe,
        eps: record.eps,
        year_high: year_range.map(|(_, high)| high).or(record.year_high),
        year_low: year_range.map(|(low, _)| low).or(record.year_low),
        beta: profile.beta,
        avg_volume: profile.vol_avg.or(record.avg_volume),
        sector: profile.sector,
        industry: profile.industry,
        website: profile.website,
        description: profile.description.as_deref().map(truncate_description),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(price: Option<f64>, previous_close: Option<f64>) -> QuoteRecord {
        QuoteRecord {
            symbol: Some("AAPL".to_string()),
            name: Some("Apple Inc.".to_string()),
            price,
            previous_close,
            ..Default::default()
        }
    }

    #[test]
    fn change_from_previous_close() {
        assert_eq!(derive_change(110.0, Some(100.0)), (10.0, 10.0));
        assert_eq!(derive_change(95.5, Some(100.0)), (-4.5, -4.5));
    }

    #[test]
    fn change_rounds_to_cents() {
        let (change, percent) = derive_change(101.236, Some(99.0));
        assert_eq!(change, 2.24);
        assert_eq!(percent, 2.26);
    }

    #[test]
    fn zero_or_missing_previous_close() {
        assert_eq!(derive_change(5.0, Some(0.0)), (5.0, 0.0));
        assert_eq!(derive_change(5.0, None), (0.0, 0.0));
    }

    #[test]
    fn builds_quote_without_profile() {
        let quote = build_quote("AAPL", record(Some(110.0), Some(100.0)), None, Utc::now()).unwrap();
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.change, 10.0);
        assert_eq!(quote.change_percent, 10.0);
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.exchange, "US Market");
        assert_eq!(quote.source, Source::Api);
        assert_eq!(quote.description, None);
    }

    #[test]
    fn profile_overrides_and_enriches() {
        let profile = ProfileRecord {
            company_name: Some("Apple Incorporated".to_string()),
            currency: Some("USD".to_string()),
            exchange_short_name: Some("NASDAQ".to_string()),
            range: Some("164.08-199.62".to_string()),
            description: Some("x".repeat(250)),
            sector: Some("Technology".to_string()),
            ..Default::default()
        };
        let quote = build_quote(
            "AAPL",
            record(Some(110.0), Some(100.0)),
            Some(&profile),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(quote.name, "Apple Incorporated");
        assert_eq!(quote.exchange, "NASDAQ");
        assert_eq!(quote.year_low, Some(164.08));
        assert_eq!(quote.year_high, Some(199.62));
        assert_eq!(quote.sector.as_deref(), Some("Technology"));

        let description = quote.description.unwrap();
        assert_eq!(description.chars().count(), 203);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn missing_price_is_malformed() {
        let err = build_quote("AAPL", record(None, Some(100.0)), None, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }
}
