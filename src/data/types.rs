use crate::error::{DecisionError, DecisionResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

/// Single exchange rate observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateObservation {
    pub id: String,
    pub rate: Decimal,

    #[serde(rename = "dateTime")]
    pub timestamp: DateTime<Utc>,
}

impl RateObservation {
    pub fn new(id: impl Into<String>, rate: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            rate,
            timestamp,
        }
    }
}

/// Which value of an observation feeds the signal engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    #[default]
    Rate,
}

impl PriceField {
    pub fn select(&self, observation: &RateObservation) -> Decimal {
        match self {
            PriceField::Rate => observation.rate,
        }
    }
}

/// Rate observations ordered strictly by timestamp, oldest first.
///
/// Construction validates the ordering and that every rate is positive, so
/// the signal engine never has to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateSeries {
    observations: Vec<RateObservation>,
}

impl RateSeries {
    pub fn new(observations: Vec<RateObservation>) -> DecisionResult<Self> {
        for (i, obs) in observations.iter().enumerate() {
            if obs.rate <= Decimal::ZERO {
                return Err(DecisionError::MalformedInput(format!(
                    "rate {} at index {} ({}) is not positive",
                    obs.rate, i, obs.id
                )));
            }
        }

        if let Some(i) = observations
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(DecisionError::MalformedInput(format!(
                "observation {} at {} is not after {}",
                observations[i + 1].id,
                observations[i + 1].timestamp,
                observations[i].timestamp
            )));
        }

        Ok(Self { observations })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[RateObservation] {
        &self.observations
    }

    pub fn last(&self) -> Option<&RateObservation> {
        self.observations.last()
    }

    /// Selected price of every observation, in order
    pub fn prices(&self, field: PriceField) -> Vec<Decimal> {
        self.observations.iter().map(|o| field.select(o)).collect()
    }

    /// Trailing sub-series of at most `len` observations ending at `end` (inclusive).
    ///
    /// A slice of a valid series is itself valid, so no re-validation happens.
    pub fn window_ending_at(&self, end: usize, len: usize) -> RateSeries {
        let end = end.min(self.observations.len().saturating_sub(1));
        let start = (end + 1).saturating_sub(len);
        let observations = if self.observations.is_empty() {
            Vec::new()
        } else {
            self.observations[start..=end].to_vec()
        };

        RateSeries { observations }
    }
}

/// Wallet balances available for trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    /// Fiat balance (e.g. GBP) available to spend
    pub base_available: Decimal,
    /// Crypto balance (e.g. BTC) available to sell
    pub crypto_available: Decimal,
}

impl Balances {
    pub fn new(base_available: Decimal, crypto_available: Decimal) -> Self {
        Self {
            base_available,
            crypto_available,
        }
    }

    pub fn validate(&self) -> DecisionResult<()> {
        if self.base_available < Decimal::ZERO {
            return Err(DecisionError::MalformedInput(format!(
                "base balance {} is negative",
                self.base_available
            )));
        }
        if self.crypto_available < Decimal::ZERO {
            return Err(DecisionError::MalformedInput(format!(
                "crypto balance {} is negative",
                self.crypto_available
            )));
        }
        Ok(())
    }
}

/// Which EMA sits on top at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ontop {
    ShortOnTop,
    LongOnTop,
}

impl Ontop {
    /// Short must be strictly greater; a tie counts as long on top.
    pub fn classify(short_ema: Decimal, long_ema: Decimal) -> Self {
        if short_ema > long_ema {
            Ontop::ShortOnTop
        } else {
            Ontop::LongOnTop
        }
    }
}

/// EMA pair and its classification at one index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossoverState {
    pub short_ema: Decimal,
    pub long_ema: Decimal,
    pub ontop: Ontop,
}

impl CrossoverState {
    pub fn new(short_ema: Decimal, long_ema: Decimal) -> Self {
        Self {
            short_ema,
            long_ema,
            ontop: Ontop::classify(short_ema, long_ema),
        }
    }
}

/// Why a decision came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    GoldenCross,
    DeathCross,
    NoCrossover,
    InsufficientData,
}

/// Outcome of one decision cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub should_trade: bool,
    pub amount: Decimal,
    pub direction: Option<Side>,
    pub reason: DecisionReason,
    /// Price at the current observation, when one was evaluated
    pub price: Option<Decimal>,
}

impl Decision {
    pub fn hold(reason: DecisionReason, price: Option<Decimal>) -> Self {
        Self {
            should_trade: false,
            amount: Decimal::ZERO,
            direction: None,
            reason,
            price,
        }
    }

    pub fn trade(side: Side, amount: Decimal, price: Decimal) -> Self {
        let reason = match side {
            Side::Buy => DecisionReason::GoldenCross,
            Side::Sell => DecisionReason::DeathCross,
        };

        Self {
            should_trade: true,
            amount,
            direction: Some(side),
            reason,
            price: Some(price),
        }
    }
}
