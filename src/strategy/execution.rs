use crate::data::Decision;
use crate::error::CycleError;
use crate::exchange::{BalanceSource, IdempotencyKey, RateSource, TradeExecutor, TradeOrder};
use crate::strategy::Decider;
use std::time::Instant;
use tracing::{error, info};

/// Result of one completed decision cycle
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub decision: Decision,
    /// The order handed to the trade executor, if any
    pub submitted: Option<TradeOrder>,
    pub latency_ms: u64,
}

/// One scheduling tick: pull rates and balances, decide, dispatch.
///
/// Collaborators are injected; the cycle holds no state between runs.
pub struct TradeCycle<R, B, T> {
    rates: R,
    balances: B,
    executor: T,
    decider: Decider,
}

impl<R, B, T> TradeCycle<R, B, T>
where
    R: RateSource,
    B: BalanceSource,
    T: TradeExecutor,
{
    pub fn new(rates: R, balances: B, executor: T, decider: Decider) -> Self {
        Self {
            rates,
            balances,
            executor,
            decider,
        }
    }

    /// Run a full cycle under the caller-supplied idempotency key.
    ///
    /// Any collaborator failure aborts the cycle; nothing is retried and no
    /// stale values are substituted.
    pub async fn run_once(&self, key: IdempotencyKey) -> Result<CycleOutcome, CycleError> {
        let started = Instant::now();

        let series = self.rates.fetch_rates().await.map_err(|e| {
            error!("Rate retrieval failed: {}", e);
            e
        })?;

        let balances = self.balances.fetch_balances().await.map_err(|e| {
            error!("Balance retrieval failed: {}", e);
            e
        })?;

        info!(
            "Deciding on {} observations | Base: {} | Crypto: {}",
            series.len(),
            balances.base_available,
            balances.crypto_available
        );

        let decision = self.decider.decide(&series, &balances).map_err(|e| {
            error!("Decision rejected: {}", e);
            e
        })?;

        let submitted = match decision.direction {
            Some(side) if decision.should_trade => {
                let order = TradeOrder {
                    side,
                    amount: decision.amount,
                    idempotency_key: key,
                };

                self.executor.submit_trade(&order).await.map_err(|e| {
                    error!("Trade submission failed: {}", e);
                    e
                })?;

                info!("✅ {:?} order submitted | Amount: {}", side, order.amount);
                Some(order)
            }
            _ => {
                info!("No trade: {:?}", decision.reason);
                None
            }
        };

        Ok(CycleOutcome {
            decision,
            submitted,
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Balances, DecisionReason, RateObservation, RateSeries, Side};
    use crate::error::CollaboratorError;
    use crate::strategy::DecisionConfig;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    struct FixedRates(Vec<Decimal>);

    #[async_trait]
    impl RateSource for FixedRates {
        async fn fetch_rates(&self) -> Result<RateSeries, CollaboratorError> {
            let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
            let observations = self
                .0
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    RateObservation::new(i.to_string(), *r, start + Duration::hours(i as i64))
                })
                .collect();
            RateSeries::new(observations).map_err(|e| CollaboratorError::malformed("rates", e))
        }
    }

    struct DownRates;

    #[async_trait]
    impl RateSource for DownRates {
        async fn fetch_rates(&self) -> Result<RateSeries, CollaboratorError> {
            Err(CollaboratorError::unavailable("rates", "connection refused"))
        }
    }

    struct FixedBalances(Balances);

    #[async_trait]
    impl BalanceSource for FixedBalances {
        async fn fetch_balances(&self) -> Result<Balances, CollaboratorError> {
            Ok(self.0)
        }
    }

    struct DownBalances;

    #[async_trait]
    impl BalanceSource for DownBalances {
        async fn fetch_balances(&self) -> Result<Balances, CollaboratorError> {
            Err(CollaboratorError::unavailable("wallet", "timed out"))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingExecutor {
        orders: Arc<Mutex<Vec<TradeOrder>>>,
    }

    #[async_trait]
    impl TradeExecutor for RecordingExecutor {
        async fn submit_trade(&self, order: &TradeOrder) -> Result<(), CollaboratorError> {
            self.orders.lock().unwrap().push(order.clone());
            Ok(())
        }
    }

    struct RejectingExecutor;

    #[async_trait]
    impl TradeExecutor for RejectingExecutor {
        async fn submit_trade(&self, _order: &TradeOrder) -> Result<(), CollaboratorError> {
            Err(CollaboratorError::unavailable("trade executor", "500 Internal Server Error"))
        }
    }

    fn crossing_rates() -> FixedRates {
        let mut rates = vec![dec!(100); 10];
        rates.push(dec!(125));
        FixedRates(rates)
    }

    fn decider() -> Decider {
        Decider::new(DecisionConfig {
            rolling_window: 1,
            ema_short_span: 2,
            ema_long_span: 5,
            ..DecisionConfig::default()
        })
        .unwrap()
    }

    fn balances() -> FixedBalances {
        FixedBalances(Balances::new(dec!(1000), dec!(0.5)))
    }

    #[tokio::test]
    async fn test_crossover_submits_with_key() {
        let executor = RecordingExecutor::default();
        let cycle = TradeCycle::new(crossing_rates(), balances(), executor.clone(), decider());

        let outcome = cycle.run_once(IdempotencyKey::from("tick-1")).await.unwrap();

        assert_eq!(outcome.decision.direction, Some(Side::Buy));
        let orders = executor.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].idempotency_key.as_str(), "tick-1");
        assert_eq!(orders[0].amount, dec!(0.8));
    }

    #[tokio::test]
    async fn test_no_crossover_submits_nothing() {
        let executor = RecordingExecutor::default();
        let flat = FixedRates(vec![dec!(100); 20]);
        let cycle = TradeCycle::new(flat, balances(), executor.clone(), decider());

        let outcome = cycle.run_once(IdempotencyKey::generate()).await.unwrap();

        assert_eq!(outcome.decision.reason, DecisionReason::NoCrossover);
        assert!(outcome.submitted.is_none());
        assert!(executor.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_source_failure_aborts_cycle() {
        let executor = RecordingExecutor::default();
        let cycle = TradeCycle::new(DownRates, balances(), executor.clone(), decider());

        let result = cycle.run_once(IdempotencyKey::generate()).await;

        assert!(matches!(
            result,
            Err(CycleError::Collaborator(CollaboratorError::Unavailable { .. }))
        ));
        assert!(executor.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_balance_source_failure_aborts_before_submit() {
        let executor = RecordingExecutor::default();
        let cycle = TradeCycle::new(crossing_rates(), DownBalances, executor.clone(), decider());

        let result = cycle.run_once(IdempotencyKey::generate()).await;

        assert!(matches!(
            result,
            Err(CycleError::Collaborator(CollaboratorError::Unavailable {
                collaborator: "wallet",
                ..
            }))
        ));
        assert!(executor.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_trade_fails_cycle() {
        let cycle = TradeCycle::new(crossing_rates(), balances(), RejectingExecutor, decider());

        let result = cycle.run_once(IdempotencyKey::from("tick-2")).await;

        assert!(matches!(
            result,
            Err(CycleError::Collaborator(CollaboratorError::Unavailable {
                collaborator: "trade executor",
                ..
            }))
        ));
    }
}
