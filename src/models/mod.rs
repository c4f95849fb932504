mod bot;
mod candle;
mod equity;
mod instrument;
mod market;
mod marker;
mod symbol;
pub mod sync_config;
pub mod time_format;
mod trade;

pub use bot::{AiStatus, BotStats, BotStatus, LastTrade};
pub use candle::Candle;
pub use equity::EquityPoint;
pub use instrument::{InstrumentLists, ScanResult};
pub use market::Ticker24h;
pub use marker::{Marker, MarkerPosition, MarkerShape};
pub use symbol::Symbol;
pub use sync_config::SyncConfig;
pub use trade::{Trade, TradeSide};

use crate::error::Result;

/// Field-level contract check run on every decoded payload
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl<T: Validate> Validate for [T] {
    fn validate(&self) -> Result<()> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<()> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}
