use anyhow::Result;
use clap::Args;
use stratdesk_lib::validation;
use stratdesk_lib::MarketDataService;

use crate::output::{build_bar_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct HistoryArgs {
    /// Ticker symbol
    pub symbol: String,

    /// Period: 1d, 1mo, 3mo, 1y, 5y, max
    #[arg(long, default_value = "1y")]
    pub period: String,

    /// Only show the newest N bars (table and csv output)
    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn run(
    args: &HistoryArgs,
    service: &MarketDataService,
    format: &OutputFormat,
) -> Result<()> {
    let period = validation::validate_period(&args.period)?;
    let resp = service.history(&args.symbol, period).await?;

    match format {
        OutputFormat::Json => print_json(&resp),
        _ => {
            let shown = args.limit.unwrap_or(resp.data.len()).min(resp.data.len());
            print_rows(build_bar_rows(&resp.data[..shown]), format)?;
        }
    }
    Ok(())
}
