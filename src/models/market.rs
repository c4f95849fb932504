use serde::{Deserialize, Serialize};

/// Rolling 24h statistics for one exchange pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker24h {
    pub pair: String,
    pub last_price: f64,
    pub change_pct: f64,
    pub high: f64,
    pub low: f64,
    /// Base asset volume
    pub volume: f64,
    /// Quote asset volume
    pub quote_volume: f64,
}

impl Ticker24h {
    pub fn is_positive(&self) -> bool {
        self.change_pct >= 0.0
    }

    pub fn quote_volume_millions(&self) -> f64 {
        self.quote_volume / 1_000_000.0
    }
}

