use anyhow::Result;
use clap::Args;
use stratdesk_lib::MarketDataService;

use crate::output::{build_quote_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct QuoteArgs {
    /// Ticker symbols (e.g. AAPL MSFT BRK.B)
    #[arg(required = true)]
    pub symbols: Vec<String>,
}

pub async fn run(
    args: &QuoteArgs,
    service: &MarketDataService,
    format: &OutputFormat,
) -> Result<()> {
    let mut quotes = Vec::with_capacity(args.symbols.len());
    for symbol in &args.symbols {
        quotes.push(service.quote(symbol).await?);
    }

    match format {
        OutputFormat::Json if quotes.len() == 1 => print_json(&quotes[0]),
        OutputFormat::Json => print_json(&quotes),
        _ => print_rows(build_quote_rows(&quotes), format)?,
    }
    Ok(())
}
