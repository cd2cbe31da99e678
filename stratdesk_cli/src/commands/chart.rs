use anyhow::Result;
use clap::Args;
use stratdesk_lib::validation;
use stratdesk_lib::MarketDataService;

use crate::output::{build_bar_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct ChartArgs {
    /// Ticker symbol
    pub symbol: String,

    /// Period: 1d (5-minute bars), 1mo, 3mo, 1y, 5y, max
    #[arg(long, default_value = "1mo")]
    pub period: String,
}

pub async fn run(
    args: &ChartArgs,
    service: &MarketDataService,
    format: &OutputFormat,
) -> Result<()> {
    let period = validation::validate_period(&args.period)?;
    let resp = service.chart(&args.symbol, period).await?;

    match format {
        OutputFormat::Json => print_json(&resp),
        _ => print_rows(build_bar_rows(&resp.data), format)?,
    }
    Ok(())
}
