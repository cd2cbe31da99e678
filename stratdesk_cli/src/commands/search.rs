use anyhow::Result;
use clap::Args;
use stratdesk_lib::MarketDataService;

use crate::output::{build_search_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct SearchArgs {
    /// Company name or ticker fragment
    pub query: String,
}

pub async fn run(
    args: &SearchArgs,
    service: &MarketDataService,
    format: &OutputFormat,
) -> Result<()> {
    let resp = service.search(&args.query).await?;

    match format {
        OutputFormat::Json => print_json(&resp),
        _ => {
            print_rows(build_search_rows(&resp.results), format)?;
            if *format == OutputFormat::Table && resp.count > resp.results.len() {
                eprintln!(
                    "Showing {} of {} matches for '{}'",
                    resp.results.len(),
                    resp.count,
                    resp.query
                );
            }
        }
    }
    Ok(())
}
