pub mod types;

pub use types::{
    Balances, CrossoverState, Decision, DecisionReason, Ontop, PriceField, RateObservation,
    RateSeries, Side,
};
