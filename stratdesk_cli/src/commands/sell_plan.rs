use anyhow::{bail, Result};
use clap::Args;
use stratdesk_lib::{sell_strategy, MarketDataService, SellPlan};

use crate::output::{build_order_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct SellPlanArgs {
    /// Base price of the first order
    #[arg(long, conflicts_with = "symbol")]
    pub base_price: Option<f64>,

    /// Use the current quote of this symbol as the base price
    #[arg(long)]
    pub symbol: Option<String>,

    /// Drop between consecutive buy orders, in percent
    #[arg(long, default_value = "5")]
    pub drop_rate: f64,

    /// Target profit of the first order, in percent
    #[arg(long, default_value = "10")]
    pub first_target: f64,

    /// Target profit of every later order, in percent
    #[arg(long, default_value = "3")]
    pub other_target: f64,

    /// Number of orders in the ladder
    #[arg(long, default_value = "4")]
    pub orders: u32,
}

pub async fn run(
    args: &SellPlanArgs,
    service: &MarketDataService,
    format: &OutputFormat,
) -> Result<()> {
    let base_price = match (args.base_price, &args.symbol) {
        (Some(price), _) => price,
        (None, Some(symbol)) => service.quote(symbol).await?.price,
        (None, None) => bail!("either --base-price or --symbol is required"),
    };

    let plan = SellPlan {
        base_price,
        drop_rate: args.drop_rate,
        first_target_profit: args.first_target,
        other_target_profit: args.other_target,
        num_orders: args.orders,
    };
    let strategy = sell_strategy(&plan)?;

    match format {
        OutputFormat::Json => print_json(&strategy),
        _ => print_rows(build_order_rows(&strategy.sell_strategy), format)?,
    }
    Ok(())
}
