use crate::error::{AppError, Result};
use crate::models::{time_format, Symbol, Validate};
use crate::utils::ensure_finite;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a logged trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl std::str::FromStr for TradeSide {
    type Err = AppError;

    /// Accepts the backend's Portuguese labels as well as BUY/SELL (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" | "COMPRA" => Ok(TradeSide::Buy),
            "SELL" | "VENDA" => Ok(TradeSide::Sell),
            other => Err(AppError::Malformed(format!(
                "Invalid trade type: '{}'. Expected BUY/COMPRA or SELL/VENDA",
                other
            ))),
        }
    }
}

impl TryFrom<String> for TradeSide {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TradeSide> for String {
    fn from(side: TradeSide) -> Self {
        side.as_str().to_string()
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the bot's trade log
///
/// The log is re-fetched wholesale every cycle; rows are never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,

    pub symbol: Symbol,

    #[serde(rename(deserialize = "tipo"), alias = "side", alias = "type")]
    pub side: TradeSide,

    #[serde(rename(deserialize = "preco"), alias = "price")]
    pub price: f64,

    #[serde(rename(deserialize = "quantidade"), alias = "quantity", default)]
    pub quantity: Option<f64>,

    /// Realized profit; null or zero for buys
    #[serde(rename(deserialize = "lucro"), alias = "profit", default)]
    pub profit: Option<f64>,

    #[serde(
        rename(deserialize = "data_hora"),
        alias = "timestamp",
        with = "time_format::flexible"
    )]
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    /// Profit reported on a SELL, break-even included; a BUY never realizes one
    pub fn realized_profit(&self) -> Option<f64> {
        match self.side {
            TradeSide::Sell => self.profit,
            TradeSide::Buy => None,
        }
    }
}

impl Validate for Trade {
    fn validate(&self) -> Result<()> {
        ensure_finite("preco", self.price)?;
        if let Some(quantity) = self.quantity {
            ensure_finite("quantidade", quantity)?;
        }
        if let Some(profit) = self.profit {
            ensure_finite("lucro", profit)?;
        }
        Ok(())
    }
}
