use crate::data::{Balances, Decision, DecisionReason, PriceField, RateSeries};
use crate::error::{DecisionError, DecisionResult};
use crate::strategy::signals::SignalEngine;
use crate::strategy::sizing::{RoundingPrecision, TradeSizer};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Parameters of the crossover strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub rolling_window: usize,
    pub ema_short_span: usize,
    pub ema_long_span: usize,
    /// Fraction of the relevant balance traded on a crossover, in (0, 1]
    pub trade_percentage: Decimal,
    pub price_field: PriceField,
    pub precision: RoundingPrecision,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            rolling_window: 100,
            ema_short_span: 9,
            ema_long_span: 21,
            trade_percentage: dec!(0.1),
            price_field: PriceField::Rate,
            precision: RoundingPrecision::default(),
        }
    }
}

impl DecisionConfig {
    pub fn validate(&self) -> DecisionResult<()> {
        if self.rolling_window == 0 {
            return Err(DecisionError::InvalidConfig(
                "rolling_window must be at least 1".into(),
            ));
        }
        if self.ema_short_span == 0 || self.ema_long_span == 0 {
            return Err(DecisionError::InvalidConfig(
                "EMA spans must be at least 1".into(),
            ));
        }
        if self.ema_short_span >= self.ema_long_span {
            return Err(DecisionError::InvalidConfig(format!(
                "ema_short_span ({}) must be below ema_long_span ({})",
                self.ema_short_span, self.ema_long_span
            )));
        }
        if self.trade_percentage <= Decimal::ZERO || self.trade_percentage > Decimal::ONE {
            return Err(DecisionError::InvalidConfig(format!(
                "trade_percentage {} is outside (0, 1]",
                self.trade_percentage
            )));
        }
        Ok(())
    }
}

/// Single entry point of the decision core: rates + balances in, decision out
///
/// Stateless between calls; safe to share across threads and call repeatedly.
#[derive(Debug, Clone)]
pub struct Decider {
    engine: SignalEngine,
    sizer: TradeSizer,
}

impl Decider {
    pub fn new(config: DecisionConfig) -> DecisionResult<Self> {
        config.validate()?;

        Ok(Self {
            engine: SignalEngine::new(
                config.rolling_window,
                config.ema_short_span,
                config.ema_long_span,
                config.price_field,
            ),
            sizer: TradeSizer::new(config.trade_percentage, config.precision),
        })
    }

    /// Observations needed before a decision can be computed
    pub fn min_observations(&self) -> usize {
        self.engine.min_observations()
    }

    /// Decide whether to trade.
    ///
    /// Too few observations yields a non-trading decision tagged
    /// `InsufficientData`. Negative balances are rejected as malformed input.
    pub fn decide(&self, series: &RateSeries, balances: &Balances) -> DecisionResult<Decision> {
        balances.validate()?;

        let signal = match self.engine.compute(series) {
            Ok(signal) => signal,
            Err(DecisionError::InsufficientData { required, available }) => {
                warn!(required, available, "Not enough rate observations to decide");
                return Ok(Decision::hold(DecisionReason::InsufficientData, None));
            }
            Err(e) => return Err(e),
        };

        debug!(
            prev_short = %signal.prev.short_ema,
            prev_long = %signal.prev.long_ema,
            curr_short = %signal.curr.short_ema,
            curr_long = %signal.curr.long_ema,
            prev_ontop = ?signal.prev.ontop,
            curr_ontop = ?signal.curr.ontop,
            "EMA crossover state"
        );

        let decision = self.sizer.size(&signal, balances)?;

        if decision.should_trade {
            info!(
                "Crossover detected: {:?} | Amount: {} | Price: {}",
                decision.reason, decision.amount, signal.current_price
            );
        }

        Ok(decision)
    }
}
