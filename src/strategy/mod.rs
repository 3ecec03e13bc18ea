pub mod signals;
pub mod sizing;
pub mod decider;
pub mod execution;

pub use signals::{CrossoverSignal, SignalEngine};
pub use sizing::{RoundingPrecision, TradeSizer};
pub use decider::{Decider, DecisionConfig};
pub use execution::{CycleOutcome, TradeCycle};
