pub mod types;
pub mod rest;

pub use types::*;
pub use rest::{HttpBalanceSource, HttpRateSource, HttpTradeExecutor, ServiceClient};
