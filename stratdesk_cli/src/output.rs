use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use stratdesk_lib::strategy::SellOrder;
use stratdesk_lib::{Bar, ExchangeRate, Quote, SearchResult, ServiceStatus};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    /// Unknown names fall back to a plain table.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "json" => Self::Json,
            "csv" => Self::Csv,
            "markdown" | "md" => Self::Markdown,
            _ => Self::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
pub struct QuoteRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Price")]
    #[serde(rename = "Price")]
    pub price: String,
    #[tabled(rename = "Change")]
    #[serde(rename = "Change")]
    pub change: String,
    #[tabled(rename = "Volume")]
    #[serde(rename = "Volume")]
    pub volume: String,
    #[tabled(rename = "Exchange")]
    #[serde(rename = "Exchange")]
    pub exchange: String,
    #[tabled(rename = "Source")]
    #[serde(rename = "Source")]
    pub source: String,
}

#[derive(Tabled, Serialize)]
pub struct SearchRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Exchange")]
    #[serde(rename = "Exchange")]
    pub exchange: String,
    #[tabled(rename = "Country")]
    #[serde(rename = "Country")]
    pub country: String,
    #[tabled(rename = "Currency")]
    #[serde(rename = "Currency")]
    pub currency: String,
}

#[derive(Tabled, Serialize)]
pub struct BarRow {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Open")]
    #[serde(rename = "Open")]
    pub open: String,
    #[tabled(rename = "High")]
    #[serde(rename = "High")]
    pub high: String,
    #[tabled(rename = "Low")]
    #[serde(rename = "Low")]
    pub low: String,
    #[tabled(rename = "Close")]
    #[serde(rename = "Close")]
    pub close: String,
    #[tabled(rename = "Adj Close")]
    #[serde(rename = "Adj Close")]
    pub adj_close: String,
    #[tabled(rename = "Volume")]
    #[serde(rename = "Volume")]
    pub volume: i64,
}

#[derive(Tabled, Serialize)]
pub struct RateRow {
    #[tabled(rename = "Pair")]
    #[serde(rename = "Pair")]
    pub pair: String,
    #[tabled(rename = "Rate")]
    #[serde(rename = "Rate")]
    pub rate: String,
    #[tabled(rename = "Source")]
    #[serde(rename = "Source")]
    pub source: String,
    #[tabled(rename = "As Of")]
    #[serde(rename = "As Of")]
    pub as_of: String,
}

#[derive(Tabled, Serialize)]
pub struct OrderRow {
    #[tabled(rename = "Order")]
    #[serde(rename = "Order")]
    pub order: u32,
    #[tabled(rename = "Buy")]
    #[serde(rename = "Buy")]
    pub buy_price: String,
    #[tabled(rename = "Drop %")]
    #[serde(rename = "Drop %")]
    pub drop_rate: String,
    #[tabled(rename = "Target %")]
    #[serde(rename = "Target %")]
    pub target_profit: String,
    #[tabled(rename = "Sell")]
    #[serde(rename = "Sell")]
    pub sell_price: String,
}

#[derive(Tabled, Serialize)]
pub struct StatusRow {
    #[tabled(rename = "Setting")]
    #[serde(rename = "Setting")]
    pub setting: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    pub value: String,
}

// -- Row builders --

pub fn build_quote_rows(quotes: &[Quote]) -> Vec<QuoteRow> {
    quotes
        .iter()
        .map(|q| QuoteRow {
            symbol: q.symbol.clone(),
            name: q.name.clone(),
            price: format!("{:.2} {}", q.price, q.currency),
            change: format_change(q.change, q.change_percent),
            volume: format_volume(q.volume),
            exchange: q.exchange.clone(),
            source: q.source.to_string(),
        })
        .collect()
}

pub fn build_search_rows(results: &[SearchResult]) -> Vec<SearchRow> {
    results
        .iter()
        .map(|r| SearchRow {
            symbol: r.symbol.clone(),
            name: r.name.clone(),
            exchange: r.exchange.clone(),
            country: r.country.clone(),
            currency: r.currency.clone(),
        })
        .collect()
}

pub fn build_bar_rows(bars: &[Bar]) -> Vec<BarRow> {
    bars.iter()
        .map(|b| BarRow {
            date: b.date.clone(),
            open: format!("{:.2}", b.open),
            high: format!("{:.2}", b.high),
            low: format!("{:.2}", b.low),
            close: format!("{:.2}", b.close),
            adj_close: format!("{:.2}", b.adj_close),
            volume: b.volume,
        })
        .collect()
}

pub fn build_rate_rows(rate: &ExchangeRate) -> Vec<RateRow> {
    vec![RateRow {
        pair: format!("{}/{}", rate.base, rate.quote),
        rate: format!("{:.2}", rate.rate),
        source: rate.source.to_string(),
        as_of: format_timestamp(&rate.timestamp),
    }]
}

pub fn build_order_rows(orders: &[SellOrder]) -> Vec<OrderRow> {
    orders
        .iter()
        .map(|o| OrderRow {
            order: o.order,
            buy_price: format!("{:.2}", o.buy_price),
            drop_rate: format!("{}%", o.drop_rate),
            target_profit: format!("{}%", o.target_profit),
            sell_price: format!("{:.2}", o.sell_price),
        })
        .collect()
}

pub fn build_status_rows(status: &ServiceStatus) -> Vec<StatusRow> {
    let row = |setting: &str, value: String| StatusRow {
        setting: setting.to_string(),
        value,
    };
    vec![
        row(
            "API key",
            if status.api_key_configured {
                "configured".to_string()
            } else {
                "demo (set FMP_API_KEY)".to_string()
            },
        ),
        row("Min interval", format!("{}ms", status.min_interval_ms)),
        row("Max attempts", status.max_attempts.to_string()),
        row(
            "Cache",
            format!("{}/{} entries", status.cache_entries, status.cache_capacity),
        ),
        row("Upstream attempts", status.requests.attempts.to_string()),
        row("Retried", status.requests.retried.to_string()),
        row("Failed", status.requests.failed.to_string()),
    ]
}

// -- Rendering --

/// Renders rows as a table, markdown table, or CSV. JSON output is handled
/// by [`print_json`] on the full result instead of the display rows.
pub fn print_rows<R: Tabled + Serialize>(rows: Vec<R>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => print_csv(rows),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
            Ok(())
        }
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", Table::new(rows));
            Ok(())
        }
    }
}

fn print_csv<R: Serialize>(rows: Vec<R>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

// -- Formatting helpers --

fn format_volume(volume: i64) -> String {
    let v = volume as f64;
    if volume >= 1_000_000_000 {
        format!("{:.1}B", v / 1_000_000_000.0)
    } else if volume >= 1_000_000 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if volume >= 1_000 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        volume.to_string()
    }
}

fn format_change(change: f64, percent: f64) -> String {
    format!("{:+.2} ({:+.2}%)", change, percent)
}

fn format_timestamp(ts: &str) -> String {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| {
            dt.with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
        })
        .unwrap_or_else(|_| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratdesk_lib::{sell_strategy, SellPlan, Source};

    fn quote() -> Quote {
        serde_json::from_value(serde_json::json!({
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 110.0,
            "change": 10.0,
            "changePercent": 10.0,
            "currency": "USD",
            "exchange": "NASDAQ",
            "timestamp": "2024-01-03T15:00:00+00:00",
            "source": "api",
            "open": 100.5,
            "dayHigh": 111.2,
            "dayLow": 99.5,
            "previousClose": 100.0,
            "volume": 51234567,
            "marketCap": null,
            "pe": null,
            "eps": null,
            "yearHigh": null,
            "yearLow": null,
            "beta": null,
            "avgVolume": null,
            "sector": null,
            "industry": null,
            "website": null,
            "description": null
        }))
        .unwrap()
    }

    #[test]
    fn parse_formats() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("CSV"), OutputFormat::Csv);
        assert_eq!(OutputFormat::parse("md"), OutputFormat::Markdown);
        assert_eq!(OutputFormat::parse("whatever"), OutputFormat::Table);
    }

    #[test]
    fn volume_formatting() {
        assert_eq!(format_volume(2_500_000_000), "2.5B");
        assert_eq!(format_volume(51_234_567), "51.2M");
        assert_eq!(format_volume(12_300), "12.3K");
        assert_eq!(format_volume(999), "999");
        assert_eq!(format_volume(0), "0");
    }

    #[test]
    fn change_formatting_is_signed() {
        assert_eq!(format_change(10.0, 10.0), "+10.00 (+10.00%)");
        assert_eq!(format_change(-4.5, -4.5), "-4.50 (-4.50%)");
    }

    #[test]
    fn timestamp_formatting() {
        assert_eq!(
            format_timestamp("2024-01-03T15:00:00+09:00"),
            "2024-01-03 06:00:00 UTC"
        );
        assert_eq!(format_timestamp("not a time"), "not a time");
    }

    #[test]
    fn quote_row_mapping() {
        let rows = build_quote_rows(&[quote()]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.symbol, "AAPL");
        assert_eq!(row.price, "110.00 USD");
        assert_eq!(row.change, "+10.00 (+10.00%)");
        assert_eq!(row.volume, "51.2M");
        assert_eq!(row.source, "api");
    }

    #[test]
    fn rate_row_mapping() {
        let rows = build_rate_rows(&ExchangeRate {
            base: "USD".to_string(),
            quote: "KRW".to_string(),
            rate: 1300.0,
            timestamp: "2024-01-03T15:00:00Z".to_string(),
            source: Source::Default,
        });
        assert_eq!(rows[0].pair, "USD/KRW");
        assert_eq!(rows[0].rate, "1300.00");
        assert_eq!(rows[0].source, "default");
    }

    #[test]
    fn order_rows_follow_ladder() {
        let strategy = sell_strategy(&SellPlan::new(100.0)).unwrap();
        let rows = build_order_rows(&strategy.sell_strategy);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].buy_price, "95.00");
        assert_eq!(rows[1].drop_rate, "5%");
        assert_eq!(rows[1].sell_price, "97.85");
    }

    #[test]
    fn bar_rows_keep_order() {
        let bars = vec![
            Bar {
                date: "2024-01-04".to_string(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 10,
                adj_close: 1.5,
            },
            Bar {
                date: "2024-01-03".to_string(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.25,
                volume: 20,
                adj_close: 1.2,
            },
        ];
        let rows = build_bar_rows(&bars);
        assert_eq!(rows[0].date, "2024-01-04");
        assert_eq!(rows[1].close, "1.25");
        assert_eq!(rows[1].adj_close, "1.20");
    }

    #[test]
    fn csv_headers_use_display_names() {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for row in build_quote_rows(&[quote()]) {
            wtr.serialize(row).unwrap();
        }
        let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let header = data.lines().next().unwrap();
        assert_eq!(header, "Symbol,Name,Price,Change,Volume,Exchange,Source");
    }
}
