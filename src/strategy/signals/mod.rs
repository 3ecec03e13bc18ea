pub mod moving_average;
pub mod crossover;

pub use crossover::{CrossoverSignal, SignalEngine};
pub use moving_average::{ema, rolling_mean, smoothing_factor};
