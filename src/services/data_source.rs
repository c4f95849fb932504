use crate::error::Result;
use crate::models::{
    AiStatus, BotStats, BotStatus, Candle, EquityPoint, SyncConfig, Symbol, Ticker24h, Trade,
};
use crate::services::{BackendClient, ExchangeClient};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// One polled endpoint, keyed by the session symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataGroup {
    Stats,
    History,
    BotStatus,
    Price,
    AiStatus,
    Candles,
    Ticker,
    Equity,
}

impl DataGroup {
    pub const ALL: [DataGroup; 8] = [
        DataGroup::Stats,
        DataGroup::History,
        DataGroup::BotStatus,
        DataGroup::Price,
        DataGroup::AiStatus,
        DataGroup::Candles,
        DataGroup::Ticker,
        DataGroup::Equity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataGroup::Stats => "stats",
            DataGroup::History => "history",
            DataGroup::BotStatus => "bot_status",
            DataGroup::Price => "price",
            DataGroup::AiStatus => "ai_status",
            DataGroup::Candles => "candles",
            DataGroup::Ticker => "ticker",
            DataGroup::Equity => "equity",
        }
    }
}

impl fmt::Display for DataGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed, validated result of one fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Stats(BotStats),
    History(Vec<Trade>),
    BotStatus(Option<BotStatus>),
    Price(f64),
    AiStatus(Option<AiStatus>),
    Candles(Vec<Candle>),
    Ticker(Ticker24h),
    Equity(Vec<EquityPoint>),
}

impl Payload {
    pub fn group(&self) -> DataGroup {
        match self {
            Payload::Stats(_) => DataGroup::Stats,
            Payload::History(_) => DataGroup::History,
            Payload::BotStatus(_) => DataGroup::BotStatus,
            Payload::Price(_) => DataGroup::Price,
            Payload::AiStatus(_) => DataGroup::AiStatus,
            Payload::Candles(_) => DataGroup::Candles,
            Payload::Ticker(_) => DataGroup::Ticker,
            Payload::Equity(_) => DataGroup::Equity,
        }
    }
}

pub type FetchFuture = Pin<Box<dyn Future<Output = Result<Payload>> + Send + 'static>>;

/// Where fetch cycles get their data from
///
/// The returned future must not borrow `self`; cycles spawn it and may outlive the call.
pub trait DataSource: Send + Sync {
    fn fetch(&self, group: DataGroup, symbol: &Symbol) -> FetchFuture;
}

/// Production source: bot backend for account state, exchange for market data
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    backend: BackendClient,
    exchange: ExchangeClient,
    kline_interval: String,
    kline_limit: u32,
}

impl HttpDataSource {
    pub fn new(
        backend: BackendClient,
        exchange: ExchangeClient,
        kline_interval: impl Into<String>,
        kline_limit: u32,
    ) -> Self {
        Self {
            backend,
            exchange,
            kline_interval: kline_interval.into(),
            kline_limit,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let backend = BackendClient::new(&config.api_url, config.request_timeout)?;
        let exchange = ExchangeClient::new(&config.exchange_url, config.request_timeout)?;
        Ok(Self::new(
            backend,
            exchange,
            config.kline_interval.clone(),
            config.kline_limit,
        ))
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn exchange(&self) -> &ExchangeClient {
        &self.exchange
    }
}

impl DataSource for HttpDataSource {
    fn fetch(&self, group: DataGroup, symbol: &Symbol) -> FetchFuture {
        let backend = self.backend.clone();
        let exchange = self.exchange.clone();
        let interval = self.kline_interval.clone();
        let limit = self.kline_limit;
        let symbol = symbol.clone();

        Box::pin(async move {
            let payload = match group {
                DataGroup::Stats => Payload::Stats(backend.stats(&symbol).await?),
                DataGroup::History => Payload::History(backend.history(&symbol).await?),
                DataGroup::BotStatus => Payload::BotStatus(backend.bot_status(&symbol).await?),
                DataGroup::AiStatus => Payload::AiStatus(backend.ai_status(&symbol).await?),
                DataGroup::Equity => Payload::Equity(backend.equity(&symbol).await?),
                DataGroup::Price => Payload::Price(exchange.price(&symbol).await?),
                DataGroup::Ticker => Payload::Ticker(exchange.ticker_24h(&symbol).await?),
                DataGroup::Candles => {
                    Payload::Candles(exchange.klines(&symbol, &interval, limit).await?)
                }
            };
            Ok(payload)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::spawn_fixture;
    use axum::{routing::get, Json, Router};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_payload_group_matches_variant() {
        assert_eq!(Payload::Price(1.0).group(), DataGroup::Price);
        assert_eq!(Payload::BotStatus(None).group(), DataGroup::BotStatus);
        assert_eq!(Payload::Equity(vec![]).group(), DataGroup::Equity);
        assert_eq!(DataGroup::ALL.len(), 8);
        assert_eq!(DataGroup::BotStatus.to_string(), "bot_status");
    }

    #[tokio::test]
    async fn test_http_source_routes_groups() {
        let router = Router::new()
            .route("/equity", get(|| async { Json(json!([{"time": 5, "value": 1.0}])) }))
            .route(
                "/api/v3/ticker/price",
                get(|| async { Json(json!({"symbol": "ETHBRL", "price": "18000.5"})) }),
            );
        let base = spawn_fixture(router).await;

        let config = SyncConfig {
            api_url: base.clone(),
            exchange_url: base,
            request_timeout: Duration::from_secs(5),
            ..SyncConfig::default()
        };
        let source = HttpDataSource::from_config(&config).unwrap();
        let symbol = Symbol::new("ETH/BRL").unwrap();

        let equity = source.fetch(DataGroup::Equity, &symbol).await.unwrap();
        assert_eq!(equity, Payload::Equity(vec![EquityPoint::new(5, 1.0)]));

        let price = source.fetch(DataGroup::Price, &symbol).await.unwrap();
        assert_eq!(price, Payload::Price(18000.5));

        let missing = source.fetch(DataGroup::Stats, &symbol).await;
        assert!(missing.unwrap_err().is_transient());
    }
}
