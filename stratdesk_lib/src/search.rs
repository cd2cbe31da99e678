//! Search reshaping: dedupe, exchange allow-list, country labels, ranking, truncation.

use std::collections::HashSet;

use fmp_api::types::SearchRecord;

use crate::error::{StratdeskError, UpstreamError};
use crate::types::SearchResult;

/// Exchanges whose listings are returned at all.
pub const ALLOWED_EXCHANGES: &[&str] = &["NYSE", "NASDAQ", "AMEX", "TSX", "LSE", "EURONEXT"];

/// US exchanges, ranked ahead of the others on otherwise equal matches.
pub const MAJOR_EXCHANGES: &[&str] = &["NYSE", "NASDAQ", "AMEX"];

/// Number of results handed back after ranking.
pub const MAX_RESULTS: usize = 10;

/// Display label for the country an exchange belongs to.
pub fn country_for_exchange(exchange: &str) -> &'static str {
    match exchange {
        "NYSE" | "NASDAQ" | "AMEX" => "United States",
        "TSX" => "Canada",
        "LSE" => "United Kingdom",
        "EURONEXT" => "Europe",
        _ => "International",
    }
}

/// Turns raw search records into ranked results.
///
/// Returns the first [`MAX_RESULTS`] results together with the number of
/// matches before truncation. A symbol seen once is never considered again,
/// even when its first listing was on an exchange outside the allow-list.
/// A record missing its symbol fails the whole search as malformed, as does a
/// kept record missing its name. Names of filtered-out records are not checked.
pub fn reshape_search(
    query: &str,
    records: Vec<SearchRecord>,
) -> Result<(Vec<SearchResult>, usize), StratdeskError> {
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for record in records {
        let symbol = record
            .symbol
            .ok_or_else(|| UpstreamError::Malformed("search result without symbol".to_string()))?;

        if !seen.insert(symbol.clone()) {
            continue;
        }

        let exchange = record.exchange_short_name.unwrap_or_default();
        if !ALLOWED_EXCHANGES.contains(&exchange.as_str()) {
            continue;
        }

        let name = record.name.ok_or_else(|| {
            UpstreamError::Malformed(format!("search result {} without name", symbol))
        })?;

        results.push(SearchResult {
            display_text: format!("{} ({})", name, symbol),
            country: country_for_exchange(&exchange).to_string(),
            currency: record.currency.unwrap_or_else(|| "USD".to_string()),
            kind: "stock".to_string(),
            symbol,
            name,
            exchange,
        });
    }

    rank(query, &mut results);
    let count = results.len();
    results.truncate(MAX_RESULTS);
    Ok((results, count))
}

/// Sorts best match first: exact symbol, symbol prefix, name prefix, major
/// exchange, then symbol alphabetically.
pub fn rank(query: &str, results: &mut [SearchResult]) {
    let query = query.trim().to_lowercase();
    results.sort_by_cached_key(|r| {
        let symbol = r.symbol.to_lowercase();
        let name = r.name.to_lowercase();
        (
            symbol != query,
            !symbol.starts_with(&query),
            !name.starts_with(&query),
            !MAJOR_EXCHANGES.contains(&r.exchange.as_str()),
            r.symbol.clone(),
        )
    });
}
