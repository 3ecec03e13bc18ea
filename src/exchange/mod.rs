pub mod idempotency;
pub mod service;

use crate::data::{Balances, RateSeries, Side};
use crate::error::CollaboratorError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

pub use idempotency::IdempotencyKey;
pub use service::{HttpBalanceSource, HttpRateSource, HttpTradeExecutor, ServiceClient};

/// Supplies the rate history a decision is computed from
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateSeries, CollaboratorError>;
}

/// Supplies current wallet balances
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balances(&self) -> Result<Balances, CollaboratorError>;
}

/// Dispatches a trade order. Deduplication on the idempotency key is the
/// executor's job.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    async fn submit_trade(&self, order: &TradeOrder) -> Result<(), CollaboratorError>;
}

/// Order handed to the trade executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeOrder {
    pub side: Side,
    pub amount: Decimal,
    pub idempotency_key: IdempotencyKey,
}
