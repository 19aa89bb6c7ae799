use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

use sales_leaderboard::{
    analyze, input, Leaderboard, Percent, ProfitBonus, SimpleRevenue, Strategies,
};

#[derive(Parser)]
/// Ranks sellers by profit and works out their bonuses.
struct Args {
    #[arg(long, value_name = "CSV")]
    /// Path to seller reference data
    sellers: PathBuf,
    #[arg(long, value_name = "CSV")]
    /// Path to product reference data
    products: PathBuf,
    #[arg(long, value_name = "CSV")]
    /// Path to purchase line items
    purchases: PathBuf,
    #[arg(long, value_name = "PCT", default_value = "15")]
    /// Bonus rate for the top seller
    top_rate: Percent,
    #[arg(long, value_name = "PCT", default_value = "10")]
    /// Bonus rate for the second and third sellers
    second_rate: Percent,
    #[arg(long, value_name = "PCT", default_value = "5")]
    /// Bonus rate for everyone else except the last seller
    base_rate: Percent,
    #[arg(long)]
    /// Ignore experience, performance, and loyalty when setting bonuses
    no_modifiers: bool,
    #[arg(long)]
    /// Print the report as JSON
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data = input::read_dataset(&args.sellers, &args.products, &args.purchases)?;
    let mut bonus = ProfitBonus {
        top: args.top_rate,
        second: args.second_rate,
        base: args.base_rate,
        ..ProfitBonus::default()
    };
    if args.no_modifiers {
        bonus = bonus.without_modifiers();
    }
    let report = Leaderboard::new(analyze(&data, &Strategies::new(SimpleRevenue, bonus))?);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
