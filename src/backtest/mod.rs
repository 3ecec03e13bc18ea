pub mod engine;

pub use engine::{BacktestConfig, BacktestEngine, BacktestResults, BacktestTrade};
