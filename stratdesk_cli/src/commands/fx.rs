use anyhow::Result;
use stratdesk_lib::{MarketDataService, Source};

use crate::output::{build_rate_rows, print_json, print_rows, OutputFormat};

pub async fn run(service: &MarketDataService, format: &OutputFormat) -> Result<()> {
    let rate = service.exchange_rate().await;

    match format {
        OutputFormat::Json => print_json(&rate),
        _ => print_rows(build_rate_rows(&rate), format)?,
    }
    if rate.source == Source::Default {
        eprintln!("Exchange-rate service unavailable; showing the built-in default rate");
    }
    Ok(())
}
