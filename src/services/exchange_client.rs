//! Public Exchange Market Data
//!
//! Read-only access to a Binance-compatible REST API: klines, the rolling 24h
//! ticker and the last traded price. Pairs are derived from the dashboard symbol
//! by stripping separators ("BTC/BRL" -> "BTCBRL").

use crate::error::{AppError, Result};
use crate::models::{Candle, Symbol, Ticker24h};
use crate::services::http::{build_client, get_json};
use crate::utils::{ensure_finite, normalize_base_url, parse_decimal};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTicker24h {
    symbol: String,
    last_price: String,
    price_change_percent: String,
    high_price: String,
    low_price: String,
    volume: String,
    quote_volume: String,
}

impl RawTicker24h {
    fn into_ticker(self) -> Result<Ticker24h> {
        Ok(Ticker24h {
            last_price: parse_decimal("lastPrice", &self.last_price)?,
            change_pct: parse_decimal("priceChangePercent", &self.price_change_percent)?,
            high: parse_decimal("highPrice", &self.high_price)?,
            low: parse_decimal("lowPrice", &self.low_price)?,
            volume: parse_decimal("volume", &self.volume)?,
            quote_volume: parse_decimal("quoteVolume", &self.quote_volume)?,
            pair: self.symbol,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    price: String,
}

/// Client for the exchange's public market data endpoints
#[derive(Debug, Clone)]
pub struct ExchangeClient {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = build_client(timeout)?;

        info!(base_url = %base_url, "Created ExchangeClient");

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /api/v3/klines?symbol=PAIR&interval=&limit=
    ///
    /// Returns the full recent window with ascending, unique open times.
    pub async fn klines(&self, symbol: &Symbol, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        let pair = symbol.exchange_pair();
        let limit = limit.to_string();
        let url = format!("{}/api/v3/klines", self.base_url);

        let rows: Vec<Value> = get_json(
            &self.client,
            &url,
            &[("symbol", pair.as_str()), ("interval", interval), ("limit", limit.as_str())],
        )
        .await?;

        let candles = rows
            .iter()
            .map(parse_kline_row)
            .collect::<Result<Vec<_>>>()?;

        let candles = normalize_candles(candles);
        debug!(pair = %pair, interval, count = candles.len(), "Fetched klines");
        Ok(candles)
    }

    /// GET /api/v3/ticker/24hr?symbol=PAIR
    pub async fn ticker_24h(&self, symbol: &Symbol) -> Result<Ticker24h> {
        let pair = symbol.exchange_pair();
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);

        let raw: RawTicker24h = get_json(&self.client, &url, &[("symbol", pair.as_str())]).await?;
        raw.into_ticker()
    }

    /// GET /api/v3/ticker/price?symbol=PAIR
    pub async fn price(&self, symbol: &Symbol) -> Result<f64> {
        let pair = symbol.exchange_pair();
        let url = format!("{}/api/v3/ticker/price", self.base_url);

        let raw: RawPrice = get_json(&self.client, &url, &[("symbol", pair.as_str())]).await?;
        parse_decimal("price", &raw.price)
    }
}

/// Parse one kline row: `[openTimeMs, "open", "high", "low", "close", "volume", closeTimeMs, ...]`
pub fn parse_kline_row(row: &Value) -> Result<Candle> {
    let fields = row
        .as_array()
        .ok_or_else(|| AppError::Malformed(format!("Kline row is not an array: {}", row)))?;

    if fields.len() < 5 {
        return Err(AppError::Malformed(format!(
            "Kline row has {} fields, expected at least 5",
            fields.len()
        )));
    }

    let open_ms = fields[0]
        .as_i64()
        .ok_or_else(|| AppError::Malformed(format!("Invalid kline open time: {}", fields[0])))?;

    let price = |idx: usize, name: &str| -> Result<f64> {
        match &fields[idx] {
            Value::String(s) => parse_decimal(name, s),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| AppError::Malformed(format!("Invalid kline {}: {}", name, n)))
                .and_then(|v| ensure_finite(name, v)),
            other => Err(AppError::Malformed(format!("Invalid kline {}: {}", name, other))),
        }
    };

    Ok(Candle::new(
        open_ms.div_euclid(1000),
        price(1, "open")?,
        price(2, "high")?,
        price(3, "low")?,
        price(4, "close")?,
    ))
}

/// Keep the first candle per open time and sort ascending
pub fn normalize_candles(candles: Vec<Candle>) -> Vec<Candle> {
    let total = candles.len();
    let mut seen_timestamps = HashSet::new();
    let mut unique: Vec<Candle> = candles
        .into_iter()
        .filter(|c| seen_timestamps.insert(c.time))
        .collect();

    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "Exchange returned duplicate kline timestamps"
        );
    }

    unique.sort_by_key(|c| c.time);
    unique
}
