use crate::constants::{OBSERVATION_DECISION, ROUND_TRIP_FEE_PCT, STOP_ALERT_PCT};
use crate::engine::chart::SurfaceView;
use crate::engine::session::{GroupHealth, SessionPhase};
use crate::models::{AiStatus, BotStats, BotStatus, Symbol, Ticker24h, Trade};
use crate::services::DataGroup;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything the UI renders for the live session, copied out under the session lock
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub symbol: Symbol,
    pub generation: u64,
    pub phase: SessionPhase,
    pub stats: Option<BotStats>,
    /// Trade log restricted to `symbol`
    pub history: Vec<Trade>,
    pub bot_status: Option<BotStatus>,
    pub price: Option<f64>,
    pub ai_status: Option<AiStatus>,
    pub ticker: Option<Ticker24h>,
    pub position: PositionView,
    pub market: Option<MarketView>,
    pub price_chart: Option<SurfaceView>,
    pub equity_chart: Option<SurfaceView>,
    pub health: BTreeMap<DataGroup, GroupHealth>,
}

/// Figures derived from the bot status and the latest price
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PositionView {
    pub is_positioned: bool,
    pub entry_price: Option<f64>,
    /// Unrealized PnL in percent, net of the round-trip fee allowance
    pub unrealized_pct: Option<f64>,
    pub stop_price: Option<f64>,
    /// Distance from price down to the stop, in percent of price
    pub stop_distance_pct: Option<f64>,
    /// Set only when an explicit stop is reported and price is within the alert band
    pub stop_alert: bool,
    /// High-water mark while positioned
    pub peak_price: Option<f64>,
    /// Retreat from the peak, in percent of the peak
    pub drawdown_from_peak_pct: Option<f64>,
    /// Flat, and the last trade ended in observation
    pub observation_mode: bool,
    pub available_balance: Option<f64>,
}

impl PositionView {
    pub fn derive(
        status: Option<&BotStatus>,
        price: Option<f64>,
        stats: Option<&BotStats>,
    ) -> Self {
        let observing = stats
            .and_then(|s| s.last_trade.as_ref())
            .and_then(|t| t.decision.as_deref())
            == Some(OBSERVATION_DECISION);

        let Some(status) = status else {
            return Self::default();
        };

        let price = price.filter(|p| *p > 0.0);
        let entry = status.entry_price.filter(|e| *e > 0.0);
        let stop = status.stop_level();
        let peak = status.peak_price.filter(|p| *p > 0.0);

        let unrealized_pct = match (status.is_positioned, entry, price) {
            (true, Some(entry), Some(price)) => {
                Some((price - entry) / entry * 100.0 - ROUND_TRIP_FEE_PCT)
            }
            _ => None,
        };

        let stop_distance_pct = match (status.is_positioned, stop, price) {
            (true, Some(stop), Some(price)) => Some((price - stop) / price * 100.0),
            _ => None,
        };

        let drawdown_from_peak_pct = match (status.is_positioned, peak, price) {
            (true, Some(peak), Some(price)) => Some((peak - price) / peak * 100.0),
            _ => None,
        };

        Self {
            is_positioned: status.is_positioned,
            entry_price: entry,
            unrealized_pct,
            stop_price: stop,
            stop_distance_pct,
            stop_alert: stop_distance_pct.is_some_and(|d| d < STOP_ALERT_PCT),
            peak_price: peak,
            drawdown_from_peak_pct,
            observation_mode: !status.is_positioned && observing,
            available_balance: Some(status.available_balance),
        }
    }
}

/// 24h ticker figures as shown on the market card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketView {
    pub last_price: f64,
    pub change_pct: f64,
    pub is_positive: bool,
    pub high: f64,
    pub low: f64,
    pub quote_volume_millions: f64,
}

impl From<&Ticker24h> for MarketView {
    fn from(ticker: &Ticker24h) -> Self {
        Self {
            last_price: ticker.last_price,
            change_pct: ticker.change_pct,
            is_positive: ticker.is_positive(),
            high: ticker.high,
            low: ticker.low,
            quote_volume_millions: ticker.quote_volume_millions(),
        }
    }
}
