use crate::data::{Balances, RateObservation, RateSeries};
use crate::error::CollaboratorError;
use crate::exchange::service::types::{TradeRequest, WalletResponse};
use crate::exchange::{BalanceSource, RateSource, TradeExecutor, TradeOrder};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

const RATE_SOURCE: &str = "rate source";
const BALANCE_SOURCE: &str = "balance source";
const TRADE_EXECUTOR: &str = "trade executor";

/// Shared HTTP client for the rate, wallet and trade services
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
}

impl ServiceClient {
    pub fn new(timeout: Duration) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CollaboratorError::unavailable("http client", e))?;

        Ok(Self { client })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        collaborator: &'static str,
        url: &Url,
    ) -> Result<T, CollaboratorError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CollaboratorError::unavailable(collaborator, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("{} request failed: {} - {}", collaborator, status, error_text);
            return Err(CollaboratorError::unavailable(
                collaborator,
                format!("{} - {}", status, error_text),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CollaboratorError::unavailable(collaborator, e))?;

        serde_json::from_slice(&body).map_err(|e| CollaboratorError::malformed(collaborator, e))
    }
}

fn parse_endpoint(collaborator: &'static str, endpoint: &str) -> Result<Url, CollaboratorError> {
    Url::parse(endpoint).map_err(|e| CollaboratorError::InvalidEndpoint {
        collaborator,
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Rate history from the data reader service
pub struct HttpRateSource {
    client: ServiceClient,
    endpoint: Url,
}

impl HttpRateSource {
    pub fn new(client: ServiceClient, endpoint: &str) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client,
            endpoint: parse_endpoint(RATE_SOURCE, endpoint)?,
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_rates(&self) -> Result<RateSeries, CollaboratorError> {
        let observations: Vec<RateObservation> =
            self.client.get_json(RATE_SOURCE, &self.endpoint).await?;

        debug!("Fetched {} rate observations", observations.len());

        RateSeries::new(observations).map_err(|e| CollaboratorError::malformed(RATE_SOURCE, e))
    }
}

/// Balances from the wallet service
pub struct HttpBalanceSource {
    client: ServiceClient,
    endpoint: Url,
    base_currency: String,
    crypto_currency: String,
}

impl HttpBalanceSource {
    pub fn new(
        client: ServiceClient,
        endpoint: &str,
        base_currency: impl Into<String>,
        crypto_currency: impl Into<String>,
    ) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client,
            endpoint: parse_endpoint(BALANCE_SOURCE, endpoint)?,
            base_currency: base_currency.into(),
            crypto_currency: crypto_currency.into(),
        })
    }

    fn available(
        &self,
        wallet: &WalletResponse,
        currency: &str,
    ) -> Result<Decimal, CollaboratorError> {
        wallet.available(currency).ok_or_else(|| {
            CollaboratorError::malformed(BALANCE_SOURCE, format!("no {} account", currency))
        })
    }
}

#[async_trait]
impl BalanceSource for HttpBalanceSource {
    async fn fetch_balances(&self) -> Result<Balances, CollaboratorError> {
        let wallet: WalletResponse = self.client.get_json(BALANCE_SOURCE, &self.endpoint).await?;

        let balances = Balances::new(
            self.available(&wallet, &self.base_currency)?,
            self.available(&wallet, &self.crypto_currency)?,
        );
        balances
            .validate()
            .map_err(|e| CollaboratorError::malformed(BALANCE_SOURCE, e))?;

        Ok(balances)
    }
}

/// Order placement through the trader service
pub struct HttpTradeExecutor {
    client: ServiceClient,
    endpoint: Url,
}

impl HttpTradeExecutor {
    pub fn new(client: ServiceClient, endpoint: &str) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client,
            endpoint: parse_endpoint(TRADE_EXECUTOR, endpoint)?,
        })
    }
}

#[async_trait]
impl TradeExecutor for HttpTradeExecutor {
    async fn submit_trade(&self, order: &TradeOrder) -> Result<(), CollaboratorError> {
        let request = TradeRequest {
            trade_type: order.side,
            amount: order.amount.to_string(),
            idempotency_key: order.idempotency_key.to_string(),
        };

        info!("{}ing {} (key {})", order.side.as_str(), order.amount, order.idempotency_key);

        let response = self
            .client
            .client
            .post(self.endpoint.clone())
            .header("Idempotency-Key", order.idempotency_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| CollaboratorError::unavailable(TRADE_EXECUTOR, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Trade failed: {} - {}", status, error_text);
            return Err(CollaboratorError::unavailable(
                TRADE_EXECUTOR,
                format!("{} - {}", status, error_text),
            ));
        }

        Ok(())
    }
}
