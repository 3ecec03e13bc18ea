use anyhow::Context;
use clap::Parser;
use crossover_trader::{
    utils, Config, Decider, HttpBalanceSource, HttpRateSource, HttpTradeExecutor,
    IdempotencyKey, ServiceClient, TradeCycle,
};
use std::time::Duration;
use tracing::{error, info};

/// Run the EMA crossover decision cycle against the rate, wallet and trade services
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to TOML configuration (falls back to CONFIG_FILE, then config/production.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    utils::init_from_config(&config.logging)?;

    info!("Starting live decider ({})", config.general.environment);
    info!(
        "Strategy: rolling {} | EMA {}/{} | trade {}",
        config.strategy.rolling_window,
        config.strategy.ema_short_span,
        config.strategy.ema_long_span,
        config.strategy.trade_percentage
    );

    let decider = Decider::new(config.strategy.decision_config())
        .context("Invalid strategy configuration")?;

    let client = ServiceClient::new(config.services.timeout())?;
    let cycle = TradeCycle::new(
        HttpRateSource::new(client.clone(), &config.services.rates_url)?,
        HttpBalanceSource::new(
            client.clone(),
            &config.services.wallet_url,
            config.general.base_currency.clone(),
            config.general.crypto_currency.clone(),
        )?,
        HttpTradeExecutor::new(client, &config.services.trade_url)?,
        decider,
    );

    if args.once || config.schedule.run_once {
        let outcome = cycle.run_once(IdempotencyKey::generate()).await?;
        info!("Cycle complete: {:?} in {}ms", outcome.decision.reason, outcome.latency_ms);
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.schedule.interval_secs));
    info!("Running every {}s. Press Ctrl+C to stop", config.schedule.interval_secs);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let key = IdempotencyKey::generate();
                match cycle.run_once(key.clone()).await {
                    Ok(outcome) => {
                        info!(
                            "Cycle {} complete: {:?} in {}ms",
                            key, outcome.decision.reason, outcome.latency_ms
                        );
                    }
                    Err(e) => {
                        // Next tick starts a fresh cycle
                        error!("Cycle {} failed: {}", key, e);
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}
