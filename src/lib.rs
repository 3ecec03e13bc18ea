pub mod data;
pub mod error;
pub mod exchange;
pub mod strategy;
pub mod backtest;
pub mod utils;

// Re-export commonly used types
pub use data::{
    Balances, Decision, DecisionReason, Ontop, PriceField, RateObservation, RateSeries, Side,
};
pub use error::{CollaboratorError, CycleError, DecisionError};
pub use exchange::{
    BalanceSource, HttpBalanceSource, HttpRateSource, HttpTradeExecutor, IdempotencyKey,
    RateSource, ServiceClient, TradeExecutor, TradeOrder,
};
pub use strategy::{
    CrossoverSignal, CycleOutcome, Decider, DecisionConfig, RoundingPrecision, SignalEngine,
    TradeCycle, TradeSizer,
};
pub use backtest::{BacktestConfig, BacktestEngine, BacktestResults};
pub use utils::Config;
