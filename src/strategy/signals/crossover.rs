use crate::data::{CrossoverState, PriceField, RateSeries};
use crate::error::{DecisionError, DecisionResult};
use crate::strategy::signals::moving_average::{ema, rolling_mean};
use rust_decimal::Decimal;
use serde::Serialize;

/// EMA crossover state at the previous and current observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossoverSignal {
    pub prev: CrossoverState,
    pub curr: CrossoverState,
    /// Raw price at the last observation
    pub current_price: Decimal,
}

impl CrossoverSignal {
    pub fn crossed(&self) -> bool {
        self.prev.ontop != self.curr.ontop
    }
}

/// Moving-average crossover engine
///
/// Algorithm:
/// 1. Smooth the selected price with a trailing rolling mean
/// 2. Run a short-span and a long-span EMA over the smoothed series
/// 3. Classify which EMA is on top at the second-to-last and last index
///
/// Holds only configuration, so one engine can serve any number of callers.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    rolling_window: usize,
    short_span: usize,
    long_span: usize,
    price_field: PriceField,
}

impl SignalEngine {
    pub fn new(
        rolling_window: usize,
        short_span: usize,
        long_span: usize,
        price_field: PriceField,
    ) -> Self {
        Self {
            rolling_window,
            short_span,
            long_span,
            price_field,
        }
    }

    /// Fewest observations for which both compared indices have a defined rolling mean
    pub fn min_observations(&self) -> usize {
        self.rolling_window + 2
    }

    pub fn compute(&self, series: &RateSeries) -> DecisionResult<CrossoverSignal> {
        let required = self.min_observations();
        if series.len() < required {
            return Err(DecisionError::InsufficientData {
                required,
                available: series.len(),
            });
        }

        let prices = series.prices(self.price_field);
        let rolling = rolling_mean(&prices, self.rolling_window);
        let short = ema(&rolling, self.short_span);
        let long = ema(&rolling, self.long_span);

        let last = prices.len() - 1;
        let prev = Self::state_at(&short, &long, last - 1)?;
        let curr = Self::state_at(&short, &long, last)?;

        Ok(CrossoverSignal {
            prev,
            curr,
            current_price: prices[last],
        })
    }

    fn state_at(
        short: &[Option<Decimal>],
        long: &[Option<Decimal>],
        index: usize,
    ) -> DecisionResult<CrossoverState> {
        match (short[index], long[index]) {
            (Some(s), Some(l)) => Ok(CrossoverState::new(s, l)),
            _ => Err(DecisionError::InsufficientData {
                required: index + 1,
                available: short.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Ontop, RateObservation};
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn series(rates: &[Decimal]) -> RateSeries {
        let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        RateSeries::new(
            rates
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    RateObservation::new(i.to_string(), *r, start + Duration::hours(i as i64))
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_insufficient_data_boundary() {
        let engine = SignalEngine::new(5, 2, 4, PriceField::Rate);

        let short = series(&vec![dec!(100); 6]);
        assert_eq!(
            engine.compute(&short),
            Err(DecisionError::InsufficientData { required: 7, available: 6 })
        );

        let enough = series(&vec![dec!(100); 7]);
        assert!(engine.compute(&enough).is_ok());
    }

    #[test]
    fn test_flat_series_ties_to_long_on_top() {
        let engine = SignalEngine::new(3, 2, 5, PriceField::Rate);
        let signal = engine.compute(&series(&vec![dec!(250.5); 20])).unwrap();

        assert_eq!(signal.curr.short_ema, signal.curr.long_ema);
        assert_eq!(signal.curr.ontop, Ontop::LongOnTop);
        assert_eq!(signal.prev.ontop, Ontop::LongOnTop);
        assert!(!signal.crossed());
        assert_eq!(signal.current_price, dec!(250.5));
    }

    #[test]
    fn test_rising_series_short_on_top() {
        let engine = SignalEngine::new(2, 2, 5, PriceField::Rate);
        let rates: Vec<Decimal> = (0..30).map(|i| Decimal::from(100 + i)).collect();
        let signal = engine.compute(&series(&rates)).unwrap();

        assert_eq!(signal.prev.ontop, Ontop::ShortOnTop);
        assert_eq!(signal.curr.ontop, Ontop::ShortOnTop);
        assert_eq!(signal.current_price, dec!(129));
    }

    #[test]
    fn test_upturn_after_flat_crosses() {
        // rolling window 1 keeps the arithmetic easy to follow:
        // flat history ties, a single higher print lifts the short EMA first
        let engine = SignalEngine::new(1, 2, 5, PriceField::Rate);
        let mut rates = vec![dec!(100); 10];
        rates.push(dec!(110));
        let signal = engine.compute(&series(&rates)).unwrap();

        assert_eq!(signal.prev.ontop, Ontop::LongOnTop);
        assert_eq!(signal.curr.ontop, Ontop::ShortOnTop);
        assert!(signal.crossed());
    }
}
