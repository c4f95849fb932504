use crate::engine::{ChartOutcome, SurfaceKind};
use crate::models::Symbol;
use crate::server::SharedEngine;
use crate::services::BackendClient;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetSymbolRequest {
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct SetSymbolResponse {
    pub symbol: Symbol,
    pub generation: u64,
}

#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    /// "price"/"candle" or "equity"/"area"
    pub surface: String,
    pub width: u32,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// GET /health
pub async fn health_handler(State(engine): State<SharedEngine>) -> impl IntoResponse {
    let health = engine.health().await;
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "engine": health })),
    )
        .into_response()
}

/// GET /snapshot?symbol=
///
/// Without `symbol` the live session is returned. With a symbol that is not live the
/// answer is 409, so a slow UI never renders another instrument's data as its own.
pub async fn snapshot_handler(
    State(engine): State<SharedEngine>,
    Query(params): Query<SnapshotQuery>,
) -> Response {
    let requested = match params.symbol.as_deref().map(Symbol::new).transpose() {
        Ok(symbol) => symbol,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let Some(snapshot) = engine.current_snapshot().await else {
        return error_response(StatusCode::NOT_FOUND, "No symbol selected");
    };

    match requested {
        Some(symbol) if symbol != snapshot.symbol => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": format!("Symbol {} is not live", symbol),
                "live_symbol": snapshot.symbol,
            })),
        )
            .into_response(),
        _ => (StatusCode::OK, Json(snapshot)).into_response(),
    }
}

/// POST /symbol
pub async fn set_symbol_handler(
    State(engine): State<SharedEngine>,
    Json(request): Json<SetSymbolRequest>,
) -> Response {
    let symbol = match Symbol::new(&request.symbol) {
        Ok(symbol) => symbol,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let generation = engine.switch_to(symbol.clone()).await;
    info!(symbol = %symbol, generation, "Symbol selected via API");

    (StatusCode::OK, Json(SetSymbolResponse { symbol, generation })).into_response()
}

/// POST /resize
pub async fn resize_handler(
    State(engine): State<SharedEngine>,
    Json(request): Json<ResizeRequest>,
) -> Response {
    let kind: SurfaceKind = match request.surface.parse() {
        Ok(kind) => kind,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("{}", e)),
    };

    let outcome = engine.resize(kind, request.width).await;
    let status = match &outcome {
        ChartOutcome::Applied => StatusCode::OK,
        ChartOutcome::Missing => StatusCode::NOT_FOUND,
        ChartOutcome::Disposed => StatusCode::CONFLICT,
        ChartOutcome::Rejected(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(outcome)).into_response()
}

/// GET /instruments
pub async fn instruments_handler(State(backend): State<BackendClient>) -> Response {
    match backend.instrument_lists().await {
        Ok(lists) => (StatusCode::OK, Json(lists)).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to fetch instrument lists");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}
