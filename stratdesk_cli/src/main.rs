mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stratdesk_lib::{Config, MarketDataService};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "stratdesk")]
#[command(about = "Quotes, search, price history and sell plans from Financial Modeling Prep")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current quote for one or more symbols
    Quote(commands::quote::QuoteArgs),
    /// Search instruments by name or ticker
    Search(commands::search::SearchArgs),
    /// Daily (or intraday) price history, newest first
    History(commands::history::HistoryArgs),
    /// Chart series in upstream order
    Chart(commands::chart::ChartArgs),
    /// USD/KRW exchange rate
    Fx,
    /// Laddered buy/sell order plan
    SellPlan(commands::sell_plan::SellPlanArgs),
    /// Show configuration and request counters
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stratdesk=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let config = Config::from_env();
    let service = MarketDataService::new(&config)?;

    match &cli.command {
        Commands::Quote(args) => commands::quote::run(args, &service, &format).await?,
        Commands::Search(args) => commands::search::run(args, &service, &format).await?,
        Commands::History(args) => commands::history::run(args, &service, &format).await?,
        Commands::Chart(args) => commands::chart::run(args, &service, &format).await?,
        Commands::Fx => commands::fx::run(&service, &format).await?,
        Commands::SellPlan(args) => commands::sell_plan::run(args, &service, &format).await?,
        Commands::Status => commands::status::run(&service, &format)?,
    }

    tracing::debug!("requests: {:?}", service.status().requests);
    Ok(())
}
