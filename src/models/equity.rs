use crate::error::Result;
use crate::models::{time_format, Validate};
use crate::utils::ensure_finite;
use serde::{Deserialize, Serialize};

/// One point of the account equity curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Unix seconds
    #[serde(with = "time_format::unix_secs")]
    pub time: i64,

    /// Total account value at `time`
    pub value: f64,
}

impl EquityPoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

impl Validate for EquityPoint {
    fn validate(&self) -> Result<()> {
        ensure_finite("value", self.value)?;
        Ok(())
    }
}
