use crate::data::{Balances, Decision, DecisionReason, Ontop, Side};
use crate::error::{DecisionError, DecisionResult};
use crate::strategy::signals::CrossoverSignal;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept on each side of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPrecision {
    /// Crypto units (BUY amounts)
    pub crypto_dp: u32,
    /// Fiat value (SELL amounts)
    pub fiat_dp: u32,
}

impl Default for RoundingPrecision {
    fn default() -> Self {
        Self {
            crypto_dp: 8,
            fiat_dp: 2,
        }
    }
}

/// Turns a crossover into a concrete trade amount
///
/// - Golden cross (long -> short on top): buy crypto with a fixed fraction of the base balance
/// - Death cross (short -> long on top): sell a fixed fraction of crypto, valued in base currency
/// - No flip: hold
#[derive(Debug, Clone)]
pub struct TradeSizer {
    trade_percentage: Decimal,
    precision: RoundingPrecision,
}

impl TradeSizer {
    pub fn new(trade_percentage: Decimal, precision: RoundingPrecision) -> Self {
        Self {
            trade_percentage,
            precision,
        }
    }

    /// Amounts that do not fit in a `Decimal` are rejected as malformed input
    pub fn size(&self, signal: &CrossoverSignal, balances: &Balances) -> DecisionResult<Decision> {
        let price = signal.current_price;

        let decision = match (signal.prev.ontop, signal.curr.ontop) {
            (Ontop::LongOnTop, Ontop::ShortOnTop) => {
                let amount = self.buy_amount(balances.base_available, price)?;
                Decision::trade(Side::Buy, amount, price)
            }
            (Ontop::ShortOnTop, Ontop::LongOnTop) => {
                let amount = self.sell_amount(balances.crypto_available, price)?;
                Decision::trade(Side::Sell, amount, price)
            }
            _ => Decision::hold(DecisionReason::NoCrossover, Some(price)),
        };

        Ok(decision)
    }

    /// Crypto units bought with `trade_percentage` of the base balance
    fn buy_amount(&self, base_available: Decimal, price: Decimal) -> DecisionResult<Decimal> {
        let amount = base_available
            .checked_mul(self.trade_percentage)
            .and_then(|budget| budget.checked_div(price))
            .ok_or_else(|| overflow("buy", base_available, price))?;
        Ok(amount.round_dp_with_strategy(self.precision.crypto_dp, RoundingStrategy::ToZero))
    }

    /// Base-currency value of `trade_percentage` of the crypto balance
    fn sell_amount(&self, crypto_available: Decimal, price: Decimal) -> DecisionResult<Decimal> {
        let amount = crypto_available
            .checked_mul(self.trade_percentage)
            .and_then(|units| units.checked_mul(price))
            .ok_or_else(|| overflow("sell", crypto_available, price))?;
        Ok(amount.round_dp_with_strategy(self.precision.fiat_dp, RoundingStrategy::ToZero))
    }
}

fn overflow(side: &str, balance: Decimal, price: Decimal) -> DecisionError {
    DecisionError::MalformedInput(format!(
        "{} amount out of range for balance {} at price {}",
        side, balance, price
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CrossoverState;
    use rust_decimal_macros::dec;

    fn signal(
        prev: (Decimal, Decimal),
        curr: (Decimal, Decimal),
        price: Decimal,
    ) -> CrossoverSignal {
        CrossoverSignal {
            prev: CrossoverState::new(prev.0, prev.1),
            curr: CrossoverState::new(curr.0, curr.1),
            current_price: price,
        }
    }

    fn sizer() -> TradeSizer {
        TradeSizer::new(dec!(0.1), RoundingPrecision::default())
    }

    #[test]
    fn test_golden_cross_buys() {
        let sig = signal((dec!(99), dec!(100)), (dec!(101), dec!(100)), dec!(40000));
        let decision = sizer().size(&sig, &Balances::new(dec!(1000), dec!(0.5))).unwrap();

        assert!(decision.should_trade);
        assert_eq!(decision.direction, Some(Side::Buy));
        assert_eq!(decision.reason, DecisionReason::GoldenCross);
        // 1000 * 0.1 / 40000
        assert_eq!(decision.amount, dec!(0.0025));
    }

    #[test]
    fn test_death_cross_sells() {
        let sig = signal((dec!(101), dec!(100)), (dec!(99), dec!(100)), dec!(40000));
        let decision = sizer().size(&sig, &Balances::new(dec!(1000), dec!(0.5))).unwrap();

        assert!(decision.should_trade);
        assert_eq!(decision.direction, Some(Side::Sell));
        assert_eq!(decision.reason, DecisionReason::DeathCross);
        // 0.5 * 0.1 * 40000
        assert_eq!(decision.amount, dec!(2000));
    }

    #[test]
    fn test_no_flip_holds() {
        let sig = signal((dec!(101), dec!(100)), (dec!(102), dec!(100)), dec!(40000));
        let decision = sizer().size(&sig, &Balances::new(dec!(1000), dec!(0.5))).unwrap();

        assert!(!decision.should_trade);
        assert_eq!(decision.amount, Decimal::ZERO);
        assert_eq!(decision.direction, None);
        assert_eq!(decision.reason, DecisionReason::NoCrossover);
    }

    #[test]
    fn test_buy_amount_rounds_toward_zero() {
        let sig = signal((dec!(99), dec!(100)), (dec!(101), dec!(100)), dec!(3));
        let decision = sizer().size(&sig, &Balances::new(dec!(1), dec!(0))).unwrap();

        // 0.1 / 3 = 0.0333...
        assert_eq!(decision.amount, dec!(0.03333333));
    }

    #[test]
    fn test_sell_amount_fiat_precision() {
        let sig = signal((dec!(101), dec!(100)), (dec!(99), dec!(100)), dec!(12345.678));
        let decision = sizer().size(&sig, &Balances::new(dec!(0), dec!(0.123))).unwrap();

        // 0.0123 * 12345.678 = 151.8518394
        assert_eq!(decision.amount, dec!(151.85));
    }

    #[test]
    fn test_oversized_sell_is_rejected() {
        let sig = signal((dec!(101), dec!(100)), (dec!(99), dec!(100)), dec!(1000000000000));
        let whale = Balances::new(dec!(0), dec!(1000000000000000000));
        let sizer = TradeSizer::new(Decimal::ONE, RoundingPrecision::default());

        let result = sizer.size(&sig, &whale);

        assert!(matches!(result, Err(DecisionError::MalformedInput(_))));
    }

    #[test]
    fn test_oversized_buy_is_rejected() {
        let sig = signal((dec!(99), dec!(100)), (dec!(101), dec!(100)), dec!(0.0000000000001));
        let whale = Balances::new(dec!(10000000000000000000000), dec!(0));
        let sizer = TradeSizer::new(Decimal::ONE, RoundingPrecision::default());

        let result = sizer.size(&sig, &whale);

        assert!(matches!(result, Err(DecisionError::MalformedInput(_))));
    }
}
