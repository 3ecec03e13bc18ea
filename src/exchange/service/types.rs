use crate::data::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One account of the wallet service response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountResponse {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub balance: Decimal,

    #[serde(default)]
    pub hold: Decimal,

    pub available: Decimal,  // Number or decimal string
}

/// Wallet service response, keyed by lowercase currency code ("gbp", "btc")
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct WalletResponse {
    pub accounts: HashMap<String, AccountResponse>,
}

impl WalletResponse {
    pub fn available(&self, currency: &str) -> Option<Decimal> {
        self.accounts
            .get(&currency.to_lowercase())
            .map(|account| account.available)
    }
}

/// Body POSTed to the trade service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradeRequest {
    #[serde(rename = "tradeType")]
    pub trade_type: Side,

    pub amount: String,  // Decimal as string, never a float

    #[serde(rename = "idempotencyKey")]
    pub idempotency_key: String,
}
