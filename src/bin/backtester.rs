use anyhow::Context;
use clap::Parser;
use crossover_trader::{
    BacktestConfig, BacktestEngine, Config, RateObservation, RateSeries,
};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Backtest the crossover strategy on historical rates
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file of rates: [{"id", "rate", "dateTime"}, ...] oldest first
    #[arg(short, long)]
    rates: PathBuf,

    /// Strategy configuration (TOML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial base-currency balance
    #[arg(long, default_value = "1000")]
    capital: Decimal,

    /// Initial crypto balance
    #[arg(long, default_value = "0")]
    crypto: Decimal,

    /// Observations handed to the decider at each step
    #[arg(long, default_value_t = 168)]
    lookback: usize,

    /// Commission in basis points charged on each fill
    #[arg(long, default_value = "0")]
    commission_bps: Decimal,

    /// Where to write the JSON results
    #[arg(long, default_value = "backtest_results.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    crossover_trader::utils::init_logger("warn", false, None)?;

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    println!("╔════════════════════════════════════════════════╗");
    println!("║         BACKTESTING ENGINE                     ║");
    println!("╚════════════════════════════════════════════════╝");
    println!();
    println!("Rates: {}", args.rates.display());
    println!("Initial Capital: {}", args.capital);
    println!();

    let contents = std::fs::read_to_string(&args.rates)
        .with_context(|| format!("Failed to read {}", args.rates.display()))?;
    let observations: Vec<RateObservation> = serde_json::from_str(&contents)?;
    let series = RateSeries::new(observations)?;

    println!("Loaded {} observations", series.len());
    println!("Running backtest...");

    let mut engine = BacktestEngine::new(BacktestConfig {
        initial_base: args.capital,
        initial_crypto: args.crypto,
        lookback: args.lookback,
        commission_bps: args.commission_bps,
        decision: config.strategy.decision_config(),
    })?;

    let results = engine.run(&series)?;
    results.print_summary();

    let json = serde_json::to_string_pretty(&results)?;
    std::fs::write(&args.output, json)?;
    println!("Results saved to: {}", args.output.display());

    Ok(())
}
