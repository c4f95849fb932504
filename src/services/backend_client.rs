use crate::error::Result;
use crate::models::{
    AiStatus, BotStats, BotStatus, EquityPoint, InstrumentLists, ScanResult, Symbol, Trade,
    Validate,
};
use crate::services::http::{build_client, get_json};
use crate::utils::{ensure_finite, normalize_base_url};
use std::time::Duration;
use tracing::{debug, info};

/// Client for the trading bot's REST backend (read-only)
///
/// Every per-symbol endpoint takes `?symbol=` with the dashboard symbol as-is ("BTC/BRL").
/// Responses are full snapshots; nothing here keeps state between calls.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a new backend client
    ///
    /// # Arguments
    /// * `base_url` - Backend base URL (e.g., "http://localhost:8000")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = build_client(timeout)?;

        info!(base_url = %base_url, "Created BackendClient");

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET /stats?symbol=
    pub async fn stats(&self, symbol: &Symbol) -> Result<BotStats> {
        let stats: BotStats =
            get_json(&self.client, &self.url("stats"), &[("symbol", symbol.as_str())]).await?;
        stats.validate()?;
        Ok(stats)
    }

    /// GET /history?symbol=
    ///
    /// Rows are returned as the backend ordered them; symbol filtering happens downstream.
    pub async fn history(&self, symbol: &Symbol) -> Result<Vec<Trade>> {
        let trades: Vec<Trade> =
            get_json(&self.client, &self.url("history"), &[("symbol", symbol.as_str())]).await?;
        trades.validate()?;
        debug!(symbol = %symbol, count = trades.len(), "Fetched trade history");
        Ok(trades)
    }

    /// GET /status-bot?symbol= (`null` while the bot has no state for the symbol)
    pub async fn bot_status(&self, symbol: &Symbol) -> Result<Option<BotStatus>> {
        let status: Option<BotStatus> = get_json(
            &self.client,
            &self.url("status-bot"),
            &[("symbol", symbol.as_str())],
        )
        .await?;
        status.validate()?;
        Ok(status)
    }

    /// GET /ia-status?symbol= (`null` until the strategy has scored the symbol)
    pub async fn ai_status(&self, symbol: &Symbol) -> Result<Option<AiStatus>> {
        let status: Option<AiStatus> = get_json(
            &self.client,
            &self.url("ia-status"),
            &[("symbol", symbol.as_str())],
        )
        .await?;
        status.validate()?;
        Ok(status)
    }

    /// GET /equity?symbol=
    ///
    /// The raw series may repeat or reorder timestamps; see `EquityDeduplicator`.
    pub async fn equity(&self, symbol: &Symbol) -> Result<Vec<EquityPoint>> {
        let points: Vec<EquityPoint> =
            get_json(&self.client, &self.url("equity"), &[("symbol", symbol.as_str())]).await?;
        points.validate()?;
        Ok(points)
    }

    /// GET /elite
    pub async fn elite(&self) -> Result<Vec<Symbol>> {
        get_json(&self.client, &self.url("elite"), &[]).await
    }

    /// GET /scan-results
    pub async fn scan_results(&self) -> Result<Vec<ScanResult>> {
        let results: Vec<ScanResult> =
            get_json(&self.client, &self.url("scan-results"), &[]).await?;
        for result in &results {
            ensure_finite("lucro", result.profit_pct)?;
        }
        Ok(results)
    }

    /// Fetch both selection lists concurrently
    pub async fn instrument_lists(&self) -> Result<InstrumentLists> {
        let (elite, scan) = tokio::try_join!(self.elite(), self.scan_results())?;
        Ok(InstrumentLists { elite, scan })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::test_support::spawn_fixture;
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn backend_router() -> Router {
        Router::new()
            .route(
                "/history",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    let symbol = params.get("symbol").cloned().unwrap_or_default();
                    Json(json!([
                        {"id": 1, "symbol": symbol, "tipo": "COMPRA", "preco": 100.0,
                         "lucro": null, "data_hora": "2024-05-01 12:00:00"},
                        {"id": 2, "symbol": symbol, "tipo": "VENDA", "preco": 110.0,
                         "lucro": 9.8, "data_hora": "2024-05-01 13:00:00"}
                    ]))
                }),
            )
            .route("/status-bot", get(|| async { Json(Value::Null) }))
            .route(
                "/equity",
                get(|| async {
                    Json(json!([{"time": 100, "value": 10.0}, {"time": 100, "value": 12.0}]))
                }),
            )
            .route(
                "/stats",
                get(|| async { Json(json!({"lucro_total": "NaN", "win_rate": 50})) }),
            )
            .route("/elite", get(|| async { Json(json!(["SOL/BRL"])) }))
            .route(
                "/scan-results",
                get(|| async {
                    Json(json!([{"symbol": "ETH/BRL", "lucro": 1.5, "decisao": "ELITE"}]))
                }),
            )
    }

    #[test]
    fn test_new_rejects_bad_scheme() {
        let result = BackendClient::new("localhost:8000", Duration::from_secs(1));
        assert!(matches!(result, Err(AppError::Config(_))));

        let client = BackendClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_history_passes_symbol_query() {
        let base = spawn_fixture(backend_router()).await;
        let client = BackendClient::new(&base, Duration::from_secs(5)).unwrap();
        let symbol = Symbol::new("BTC/BRL").unwrap();

        let trades = client.history(&symbol).await.unwrap();
        assert_eq!(trades.len(), 2);
        assert!(trades.iter().all(|t| t.symbol == symbol));
        assert_eq!(trades[1].realized_profit(), Some(9.8));
    }

    #[tokio::test]
    async fn test_null_status_and_raw_equity() {
        let base = spawn_fixture(backend_router()).await;
        let client = BackendClient::new(&base, Duration::from_secs(5)).unwrap();
        let symbol = Symbol::new("BTC/BRL").unwrap();

        assert_eq!(client.bot_status(&symbol).await.unwrap(), None);
        // Duplicates are preserved here and collapsed later
        assert_eq!(client.equity(&symbol).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bad_payload_and_missing_route_are_transient() {
        let base = spawn_fixture(backend_router()).await;
        let client = BackendClient::new(&base, Duration::from_secs(5)).unwrap();
        let symbol = Symbol::new("BTC/BRL").unwrap();

        let stats = client.stats(&symbol).await.unwrap_err();
        assert!(matches!(stats, AppError::Parse(_)), "{}", stats);
        assert!(stats.is_transient());

        let ai = client.ai_status(&symbol).await.unwrap_err();
        assert!(matches!(ai, AppError::Network(_)), "{}", ai);
        assert!(ai.is_transient());
    }

    #[tokio::test]
    async fn test_instrument_lists() {
        let base = spawn_fixture(backend_router()).await;
        let client = BackendClient::new(&base, Duration::from_secs(5)).unwrap();

        let lists = client.instrument_lists().await.unwrap();
        assert_eq!(lists.elite, vec![Symbol::new("SOL/BRL").unwrap()]);
        assert_eq!(lists.scan.len(), 1);
        assert_eq!(lists.default_symbol(), Some(Symbol::new("SOL/BRL").unwrap()));
    }
}
