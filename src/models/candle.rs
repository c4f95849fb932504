use crate::error::Result;
use crate::models::Validate;
use crate::utils::ensure_finite;
use serde::{Deserialize, Serialize};

/// One exchange candle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Exchange-reported open time (unix seconds)
    pub time: i64,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }
}

impl Validate for Candle {
    fn validate(&self) -> Result<()> {
        ensure_finite("open", self.open)?;
        ensure_finite("high", self.high)?;
        ensure_finite("low", self.low)?;
        ensure_finite("close", self.close)?;
        Ok(())
    }
}
