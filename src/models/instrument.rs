use crate::models::Symbol;
use serde::{Deserialize, Serialize};

/// One row of the backend's calibration scan (24h backtest per symbol)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbol: Symbol,

    /// Backtest profit in percent
    #[serde(rename(deserialize = "lucro"), alias = "profit_pct")]
    pub profit_pct: f64,

    /// "ELITE" or "OBSERVAÇÃO"
    #[serde(rename(deserialize = "decisao"), alias = "decision", default)]
    pub decision: String,
}

/// Instrument selection lists offered to the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentLists {
    pub elite: Vec<Symbol>,
    pub scan: Vec<ScanResult>,
}

impl InstrumentLists {
    /// Symbol to watch when the user has not chosen one: first elite, else first scanned
    pub fn default_symbol(&self) -> Option<Symbol> {
        self.elite
            .first()
            .cloned()
            .or_else(|| self.scan.first().map(|r| r.symbol.clone()))
    }
}
