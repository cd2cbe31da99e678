use anyhow::Result;
use stratdesk_lib::MarketDataService;

use crate::output::{build_status_rows, print_json, print_rows, OutputFormat};

pub fn run(service: &MarketDataService, format: &OutputFormat) -> Result<()> {
    let status = service.status();
    match format {
        OutputFormat::Json => print_json(&status),
        _ => print_rows(build_status_rows(&status), format)?,
    }
    Ok(())
}
