use crate::data::PriceField;
use crate::strategy::{DecisionConfig, RoundingPrecision};
use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `CROSSOVER__STRATEGY__TRADE_PERCENTAGE=0.2`
pub const ENV_PREFIX: &str = "CROSSOVER";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub strategy: StrategyConfig,
    pub services: ServicesConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub base_currency: String,
    pub crypto_currency: String,
    pub environment: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            base_currency: "GBP".into(),
            crypto_currency: "BTC".into(),
            environment: "development".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub rolling_window: usize,
    pub ema_short_span: usize,
    pub ema_long_span: usize,
    pub trade_percentage: Decimal,
    pub price_field: PriceField,
    pub crypto_dp: u32,
    pub fiat_dp: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            rolling_window: 100,
            ema_short_span: 9,
            ema_long_span: 21,
            trade_percentage: dec!(0.1),
            price_field: PriceField::Rate,
            crypto_dp: 8,
            fiat_dp: 2,
        }
    }
}

impl StrategyConfig {
    pub fn decision_config(&self) -> DecisionConfig {
        DecisionConfig {
            rolling_window: self.rolling_window,
            ema_short_span: self.ema_short_span,
            ema_long_span: self.ema_long_span,
            trade_percentage: self.trade_percentage,
            price_field: self.price_field,
            precision: RoundingPrecision {
                crypto_dp: self.crypto_dp,
                fiat_dp: self.fiat_dp,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub rates_url: String,
    pub wallet_url: String,
    pub trade_url: String,
    pub timeout_ms: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            rates_url: "http://localhost:8080/rates".into(),
            wallet_url: "http://localhost:8080/wallet".into(),
            trade_url: "http://localhost:8080/trade".into(),
            timeout_ms: 10_000,
        }
    }
}

impl ServicesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    pub run_once: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            run_once: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub output: String,
    pub file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            output: "pretty".into(),
            file_path: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from a TOML file (if present) layered under `CROSSOVER__*` environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load from the file named by `CONFIG_FILE`, or the default path
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_FILE")
            .unwrap_or_else(|_| "config/production.toml".to_string());
        Self::load_from(path)
    }
}
