//! Polling, Exchange and Chart Constants
//!
//! Defaults for the fetch cycles, the public exchange endpoints and the
//! marker palette used on the price chart.

/// Default bot backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default public exchange base URL (Binance-compatible REST API)
pub const DEFAULT_EXCHANGE_URL: &str = "https://api.binance.com";

/// Instrument selected when neither the CLI nor the backend names one
pub const DEFAULT_SYMBOL: &str = "BTC/BRL";

/// Fast cycle: bot state and spot price
pub const DEFAULT_FAST_PERIOD_SECS: u64 = 2;

/// Slow cycle: candles, 24h ticker and equity curve
pub const DEFAULT_SLOW_PERIOD_SECS: u64 = 5;

/// HTTP request timeout for every polled endpoint
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Candle interval requested from the exchange
pub const DEFAULT_KLINE_INTERVAL: &str = "15m";

/// Number of candles per refresh (full recent window, replaced on every fetch)
pub const DEFAULT_KLINE_LIMIT: u32 = 100;

/// Kline intervals accepted by the exchange
pub const VALID_KLINE_INTERVALS: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w", "1M",
];

/// Upper bound the exchange enforces on `limit`
pub const MAX_KLINE_LIMIT: u32 = 1000;

/// Round-trip fee allowance subtracted from the unrealized PnL figure (percent)
pub const ROUND_TRIP_FEE_PCT: f64 = 0.2;

/// Decision label the backend uses when a symbol is only being observed
pub const OBSERVATION_DECISION: &str = "OBSERVAÇÃO";

/// Chart containers
pub mod container {
    pub const PRICE_ID: &str = "price";
    pub const PRICE_WIDTH: u32 = 800;
    pub const PRICE_HEIGHT: u32 = 300;

    pub const EQUITY_ID: &str = "equity";
    pub const EQUITY_WIDTH: u32 = 800;
    pub const EQUITY_HEIGHT: u32 = 200;
}

/// Marker palette
pub mod marker_color {
    pub const BUY: &str = "#10b981";
    pub const SELL: &str = "#ef4444";
}

/// Stop distance (percent of price) below which the position is flagged as at risk
pub const STOP_ALERT_PCT: f64 = 0.3;
