//! CLI subcommand implementations.

pub mod chart;
pub mod fx;
pub mod history;
pub mod quote;
pub mod search;
pub mod sell_plan;
pub mod status;
