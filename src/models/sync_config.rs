use crate::constants::{
    DEFAULT_API_URL, DEFAULT_EXCHANGE_URL, DEFAULT_FAST_PERIOD_SECS, DEFAULT_KLINE_INTERVAL,
    DEFAULT_KLINE_LIMIT, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SLOW_PERIOD_SECS, DEFAULT_SYMBOL,
    MAX_KLINE_LIMIT, VALID_KLINE_INTERVALS,
};
use crate::error::{AppError, Result};
use crate::models::Symbol;
use crate::utils::{env_var, normalize_base_url};
use std::time::Duration;

/// Environment variable names
pub mod env {
    pub const API_URL: &str = "TRADEWATCH_API_URL";
    pub const EXCHANGE_URL: &str = "TRADEWATCH_EXCHANGE_URL";
    pub const FAST_SECS: &str = "TRADEWATCH_FAST_SECS";
    pub const SLOW_SECS: &str = "TRADEWATCH_SLOW_SECS";
    pub const KLINE_INTERVAL: &str = "TRADEWATCH_KLINE_INTERVAL";
    pub const KLINE_LIMIT: &str = "TRADEWATCH_KLINE_LIMIT";
    pub const TIMEOUT_SECS: &str = "TRADEWATCH_TIMEOUT_SECS";
    pub const DEFAULT_SYMBOL: &str = "TRADEWATCH_DEFAULT_SYMBOL";
}

/// Configuration for the polling and chart-sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Bot backend base URL (no trailing slash)
    pub api_url: String,

    /// Public exchange base URL (no trailing slash)
    pub exchange_url: String,

    /// Period for bot state, spot price and brain status
    pub fast_period: Duration,

    /// Period for candles, 24h ticker and equity curve
    pub slow_period: Duration,

    /// Candle interval (e.g. "15m")
    pub kline_interval: String,

    /// Candles per refresh
    pub kline_limit: u32,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Symbol used when neither the CLI nor the backend lists provide one
    pub default_symbol: Symbol,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            exchange_url: DEFAULT_EXCHANGE_URL.to_string(),
            fast_period: Duration::from_secs(DEFAULT_FAST_PERIOD_SECS),
            slow_period: Duration::from_secs(DEFAULT_SLOW_PERIOD_SECS),
            kline_interval: DEFAULT_KLINE_INTERVAL.to_string(),
            kline_limit: DEFAULT_KLINE_LIMIT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            default_symbol: Symbol::from_static(DEFAULT_SYMBOL),
        }
    }
}

impl SyncConfig {
    /// Load configuration from `TRADEWATCH_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var)
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(env::API_URL) {
            config.api_url = url;
        }
        if let Some(url) = lookup(env::EXCHANGE_URL) {
            config.exchange_url = url;
        }
        if let Some(secs) = lookup(env::FAST_SECS) {
            config.fast_period = Duration::from_secs(parse_number(env::FAST_SECS, &secs)?);
        }
        if let Some(secs) = lookup(env::SLOW_SECS) {
            config.slow_period = Duration::from_secs(parse_number(env::SLOW_SECS, &secs)?);
        }
        if let Some(interval) = lookup(env::KLINE_INTERVAL) {
            config.kline_interval = interval;
        }
        if let Some(limit) = lookup(env::KLINE_LIMIT) {
            config.kline_limit = parse_number(env::KLINE_LIMIT, &limit)?;
        }
        if let Some(secs) = lookup(env::TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(parse_number(env::TIMEOUT_SECS, &secs)?);
        }
        if let Some(symbol) = lookup(env::DEFAULT_SYMBOL) {
            config.default_symbol = Symbol::new(symbol)
                .map_err(|e| AppError::Config(format!("{}: {}", env::DEFAULT_SYMBOL, e)))?;
        }

        config.validate()
    }

    /// Normalize URLs and check ranges; returns the cleaned config
    pub fn validate(mut self) -> Result<Self> {
        self.api_url = normalize_base_url(&self.api_url)?;
        self.exchange_url = normalize_base_url(&self.exchange_url)?;

        if self.fast_period.is_zero() || self.slow_period.is_zero() {
            return Err(AppError::Config(
                "Polling periods must be at least one second".to_string(),
            ));
        }

        if !VALID_KLINE_INTERVALS.contains(&self.kline_interval.as_str()) {
            return Err(AppError::Config(format!(
                "Invalid kline interval: {}. Valid options: {}",
                self.kline_interval,
                VALID_KLINE_INTERVALS.join(", ")
            )));
        }

        if self.kline_limit == 0 || self.kline_limit > MAX_KLINE_LIMIT {
            return Err(AppError::Config(format!(
                "Kline limit must be between 1 and {}, got {}",
                MAX_KLINE_LIMIT, self.kline_limit
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(AppError::Config("Request timeout must be positive".to_string()));
        }

        Ok(self)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| AppError::Config(format!("{}: invalid value '{}': {}", name, raw, e)))
}
