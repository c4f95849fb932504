use crate::error::Result;
use crate::models::{TradeSide, Validate};
use crate::utils::ensure_finite;
use serde::{Deserialize, Serialize};

/// Polled snapshot of the bot's position for one symbol (read-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStatus {
    #[serde(rename(deserialize = "posicionado"), alias = "is_positioned")]
    pub is_positioned: bool,

    #[serde(rename(deserialize = "preco_compra"), alias = "entry_price", default)]
    pub entry_price: Option<f64>,

    #[serde(rename(deserialize = "qtd_btc"), alias = "quantity", default)]
    pub quantity: Option<f64>,

    #[serde(rename(deserialize = "preco_stop"), alias = "stop_price", default)]
    pub stop_price: Option<f64>,

    /// Highest price seen while positioned (trailing-stop anchor)
    #[serde(rename(deserialize = "preco_maximo"), alias = "peak_price", default)]
    pub peak_price: Option<f64>,

    #[serde(rename(deserialize = "saldo_disponivel"), alias = "available_balance")]
    pub available_balance: f64,
}

impl BotStatus {
    /// Explicit stop level, when the backend reports one
    ///
    /// `peak_price` is the high-water mark trailing stops are measured from, never a stop.
    pub fn stop_level(&self) -> Option<f64> {
        self.stop_price.filter(|p| *p > 0.0)
    }
}

impl Validate for BotStatus {
    fn validate(&self) -> Result<()> {
        ensure_finite("saldo_disponivel", self.available_balance)?;
        for (field, value) in [
            ("preco_compra", self.entry_price),
            ("qtd_btc", self.quantity),
            ("preco_stop", self.stop_price),
            ("preco_maximo", self.peak_price),
        ] {
            if let Some(v) = value {
                ensure_finite(field, v)?;
            }
        }
        Ok(())
    }
}

/// Most recent trade as summarized by `/stats`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LastTrade {
    #[serde(default)]
    pub symbol: Option<String>,

    #[serde(rename(deserialize = "tipo"), alias = "side", default)]
    pub side: Option<TradeSide>,

    #[serde(rename(deserialize = "preco"), alias = "price", default)]
    pub price: Option<f64>,

    #[serde(rename(deserialize = "lucro"), alias = "profit", default)]
    pub profit: Option<f64>,

    #[serde(rename(deserialize = "decisao"), alias = "decision", default)]
    pub decision: Option<String>,

    #[serde(rename(deserialize = "data_hora"), alias = "timestamp", default)]
    pub timestamp: Option<String>,
}

/// Performance summary from `/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStats {
    #[serde(rename(deserialize = "lucro_total"), alias = "total_profit")]
    pub total_profit: f64,

    pub win_rate: f64,

    #[serde(default)]
    pub total_trades: Option<u64>,

    #[serde(default)]
    pub profit_factor: Option<f64>,

    #[serde(default)]
    pub sharpe_ratio: Option<f64>,

    #[serde(default)]
    pub max_drawdown: Option<f64>,

    #[serde(rename(deserialize = "ultimo_trade"), alias = "last_trade", default)]
    pub last_trade: Option<LastTrade>,
}

impl Validate for BotStats {
    fn validate(&self) -> Result<()> {
        ensure_finite("lucro_total", self.total_profit)?;
        ensure_finite("win_rate", self.win_rate)?;
        for (field, value) in [
            ("profit_factor", self.profit_factor),
            ("sharpe_ratio", self.sharpe_ratio),
            ("max_drawdown", self.max_drawdown),
        ] {
            if let Some(v) = value {
                ensure_finite(field, v)?;
            }
        }
        Ok(())
    }
}

/// Strategy brain readout from `/ia-status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiStatus {
    pub rsi: f64,

    /// Entry score, 0 to 10
    #[serde(rename(deserialize = "potencial"), alias = "score")]
    pub score: f64,

    #[serde(rename(deserialize = "decisao"), alias = "decision")]
    pub decision: String,

    #[serde(rename(deserialize = "atualizado_em"), alias = "updated_at", default)]
    pub updated_at: Option<String>,
}

impl Validate for AiStatus {
    fn validate(&self) -> Result<()> {
        ensure_finite("rsi", self.rsi)?;
        ensure_finite("potencial", self.score)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_status_from_backend() {
        let raw = r#"{"saldo_disponivel": 1000.0, "posicionado": true, "preco_compra": 350000.0,
                      "qtd_btc": 0.002, "preco_maximo": 356000.0}"#;
        let status: BotStatus = serde_json::from_str(raw).unwrap();
        assert!(status.is_positioned);
        assert_eq!(status.entry_price, Some(350000.0));
        assert_eq!(status.stop_price, None);
        assert_eq!(status.peak_price, Some(356000.0));
        assert_eq!(status.stop_level(), None);
    }

    #[test]
    fn test_explicit_stop_level() {
        let raw = r#"{"saldo_disponivel": 0.0, "posicionado": true, "preco_compra": 100.0,
                      "preco_stop": 97.5, "preco_maximo": 104.0}"#;
        let status: BotStatus = serde_json::from_str(raw).unwrap();
        assert_eq!(status.stop_level(), Some(97.5));
        assert_eq!(status.peak_price, Some(104.0));
    }

    #[test]
    fn test_null_status_is_none() {
        let status: Option<BotStatus> = serde_json::from_str("null").unwrap();
        assert!(status.is_none());
    }

    #[test]
    fn test_stats_minimal_shape() {
        let raw = r#"{"lucro_total": 0, "win_rate": 0, "total_trades": 0}"#;
        let stats: BotStats = serde_json::from_str(raw).unwrap();
        assert_eq!(stats.total_trades, Some(0));
        assert!(stats.last_trade.is_none());
        assert!(stats.validate().is_ok());
    }

    #[test]
    fn test_stats_with_last_trade_decision() {
        let raw = r#"{"lucro_total": -3.2, "win_rate": 40.0, "profit_factor": 0.8,
                      "sharpe_ratio": -0.1, "max_drawdown": 5.5,
                      "ultimo_trade": {"symbol": "BTC/BRL", "tipo": "VENDA", "lucro": -1.0,
                                       "decisao": "OBSERVAÇÃO", "id": 9}}"#;
        let stats: BotStats = serde_json::from_str(raw).unwrap();
        let last = stats.last_trade.unwrap();
        assert_eq!(last.side, Some(TradeSide::Sell));
        assert_eq!(last.decision.as_deref(), Some("OBSERVAÇÃO"));
    }
}
