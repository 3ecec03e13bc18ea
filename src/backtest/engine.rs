use crate::data::{Balances, Decision, RateSeries, Side};
use crate::error::{DecisionError, DecisionResult};
use crate::strategy::{Decider, DecisionConfig};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Backtest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_base: Decimal,
    pub initial_crypto: Decimal,
    /// Observations handed to the decider at each step (one week of hourly rates by default)
    pub lookback: usize,
    /// Charged on the base-currency leg of every simulated fill
    pub commission_bps: Decimal,
    pub decision: DecisionConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_base: Decimal::from(1000),
            initial_crypto: Decimal::ZERO,
            lookback: 168,
            commission_bps: Decimal::ZERO,
            decision: DecisionConfig::default(),
        }
    }
}

/// Simulated fill of one decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestTrade {
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub price: Decimal,
    /// Decision amount: crypto units for buys, base value for sells
    pub amount: Decimal,
    /// Change applied to the simulated wallet, commission included
    pub base_delta: Decimal,
    pub crypto_delta: Decimal,
    pub commission: Decimal,
}

/// Replays a rate history through the decider against a simulated wallet
pub struct BacktestEngine {
    config: BacktestConfig,
    decider: Decider,
    wallet: Balances,
    trades: Vec<BacktestTrade>,
    decisions_evaluated: usize,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> DecisionResult<Self> {
        let decider = Decider::new(config.decision.clone())?;
        let wallet = Balances::new(config.initial_base, config.initial_crypto);
        wallet.validate()?;

        Ok(Self {
            config,
            decider,
            wallet,
            trades: vec![],
            decisions_evaluated: 0,
        })
    }

    /// Sweep a trailing window over `series`, one decision per observation
    pub fn run(&mut self, series: &RateSeries) -> DecisionResult<BacktestResults> {
        let window = self.config.lookback.max(self.decider.min_observations());
        let first = self.decider.min_observations().saturating_sub(1);

        for end in first..series.len() {
            let slice = series.window_ending_at(end, window);
            let decision = self.decider.decide(&slice, &self.wallet)?;
            self.decisions_evaluated += 1;

            if decision.should_trade {
                let timestamp = series.observations()[end].timestamp;
                self.apply(&decision, timestamp)?;
            }
        }

        let first_price = series.observations().first().map(|o| o.rate).unwrap_or(Decimal::ZERO);
        let last_price = series.last().map(|o| o.rate).unwrap_or(Decimal::ZERO);
        Ok(self.get_results(first_price, last_price))
    }

    /// Fill a trading decision against the simulated wallet.
    ///
    /// A buy whose cost plus commission exceeds the base balance is shrunk so the
    /// whole charge fits; the recorded deltas are exactly what the wallet moves by.
    fn apply(&mut self, decision: &Decision, timestamp: DateTime<Utc>) -> DecisionResult<()> {
        let (Some(side), Some(price)) = (decision.direction, decision.price) else {
            return Ok(());
        };
        let commission_rate = self.config.commission_bps / Decimal::from(10000);

        let trade = match side {
            Side::Buy => {
                let mut units = decision.amount;
                let (mut cost, mut commission) = buy_charge(units, price, commission_rate)?;

                if cost + commission > self.wallet.base_available {
                    let gross_price = price * (Decimal::ONE + commission_rate);
                    units = (self.wallet.base_available / gross_price).round_dp_with_strategy(
                        self.config.decision.precision.crypto_dp,
                        RoundingStrategy::ToZero,
                    );
                    (cost, commission) = buy_charge(units, price, commission_rate)?;
                }

                BacktestTrade {
                    timestamp,
                    side,
                    price,
                    amount: decision.amount,
                    base_delta: -(cost + commission),
                    crypto_delta: units,
                    commission,
                }
            }
            Side::Sell => {
                let commission = decision.amount * commission_rate;
                let units = (decision.amount / price).min(self.wallet.crypto_available);
                BacktestTrade {
                    timestamp,
                    side,
                    price,
                    amount: decision.amount,
                    base_delta: decision.amount - commission,
                    crypto_delta: -units,
                    commission,
                }
            }
        };

        self.wallet.base_available += trade.base_delta;
        self.wallet.crypto_available += trade.crypto_delta;

        debug!(
            "Simulated {:?} at {} | Base: {} | Crypto: {}",
            side, price, self.wallet.base_available, self.wallet.crypto_available
        );

        self.trades.push(trade);
        Ok(())
    }

    pub fn wallet(&self) -> &Balances {
        &self.wallet
    }

    /// Get backtest results, valuing the starting wallet at `first_price`
    /// and the final one at `last_price`
    pub fn get_results(&self, first_price: Decimal, last_price: Decimal) -> BacktestResults {
        BacktestResults::new(
            self.config.clone(),
            self.trades.clone(),
            self.decisions_evaluated,
            self.wallet,
            first_price,
            last_price,
        )
    }
}

/// Base-currency cost of `units` at `price`, and the commission charged on it
fn buy_charge(units: Decimal, price: Decimal, rate: Decimal) -> DecisionResult<(Decimal, Decimal)> {
    let cost = units.checked_mul(price).ok_or_else(|| {
        DecisionError::MalformedInput(format!("fill of {} at {} out of range", units, price))
    })?;
    Ok((cost, cost * rate))
}

/// Backtest results with metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResults {
    pub config: BacktestConfig,
    pub trades: Vec<BacktestTrade>,
    pub decisions_evaluated: usize,
    pub buys: usize,
    pub sells: usize,
    pub total_commission: Decimal,
    pub final_wallet: Balances,
    pub last_price: Decimal,
    pub initial_value: Decimal,
    pub final_value: Decimal,
    pub total_return_pct: Decimal,
}

impl BacktestResults {
    pub fn new(
        config: BacktestConfig,
        trades: Vec<BacktestTrade>,
        decisions_evaluated: usize,
        final_wallet: Balances,
        first_price: Decimal,
        last_price: Decimal,
    ) -> Self {
        let buys = trades.iter().filter(|t| t.side == Side::Buy).count();
        let sells = trades.len() - buys;
        let total_commission: Decimal = trades.iter().map(|t| t.commission).sum();

        let initial_value = config.initial_base + config.initial_crypto * first_price;
        let final_value = final_wallet.base_available + final_wallet.crypto_available * last_price;

        let total_return_pct = if initial_value.is_zero() {
            Decimal::ZERO
        } else {
            ((final_value - initial_value) / initial_value * dec!(100)).round_dp(2)
        };

        Self {
            config,
            trades,
            decisions_evaluated,
            buys,
            sells,
            total_commission,
            final_wallet,
            last_price,
            initial_value,
            final_value,
            total_return_pct,
        }
    }

    /// Print results summary
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════╗");
        println!("║         BACKTEST RESULTS SUMMARY               ║");
        println!("╠════════════════════════════════════════════════╣");
        println!("║ Decisions Evaluated: {:<27} ║", self.decisions_evaluated);
        println!("║ Trades: {:<40} ║", self.trades.len());
        println!("║ Buys: {:<42} ║", self.buys);
        println!("║ Sells: {:<41} ║", self.sells);
        println!("║ Commission Paid: {:<31} ║", self.total_commission.round_dp(2));
        println!("╠════════════════════════════════════════════════╣");
        println!("║ Final Base: {:<36} ║", self.final_wallet.base_available.round_dp(2));
        println!("║ Final Crypto: {:<34} ║", self.final_wallet.crypto_available.round_dp(8));
        println!("║ Last Price: {:<36} ║", self.last_price);
        println!("║ Initial Value: {:<33} ║", self.initial_value.round_dp(2));
        println!("║ Final Value: {:<35} ║", self.final_value.round_dp(2));
        println!("║ Return %: {:<37} ║", self.total_return_pct);
        println!("╚════════════════════════════════════════════════╝\n");
    }
}
