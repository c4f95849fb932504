use crate::models::TradeSide;
use serde::{Deserialize, Serialize};

/// Where a marker sits relative to the candle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPosition {
    BelowBar,
    AboveBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
}

/// Trade annotation on the price chart, rebuilt from the trade log on every pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Unix seconds
    pub time: i64,
    pub side: TradeSide,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub color: String,
    pub text: String,
    /// Backend id of the trade this marker annotates
    pub trade_id: i64,
}
