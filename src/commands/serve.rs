use crate::commands::resolve_symbol;
use crate::engine::{MemorySurfaceFactory, SyncEngine};
use crate::error::Result;
use crate::models::SyncConfig;
use crate::server::{self, AppState};
use crate::services::HttpDataSource;
use std::sync::Arc;
use tracing::info;

pub async fn run(config: SyncConfig, port: u16, symbol: Option<String>) -> Result<()> {
    println!("🚀 Starting tradewatch server on port {}", port);
    println!("📡 Bot backend: {}", config.api_url);
    println!("📈 Exchange:    {}", config.exchange_url);

    let source = HttpDataSource::from_config(&config)?;
    let backend = source.backend().clone();
    let symbol = resolve_symbol(symbol, &backend, &config).await?;

    let engine = Arc::new(SyncEngine::new(
        config,
        Arc::new(source),
        Arc::new(MemorySurfaceFactory::new()),
    ));

    let generation = engine.switch_to(symbol.clone()).await;
    info!(symbol = %symbol, generation, "Initial session opened");

    let app_state = AppState {
        engine: engine.clone(),
        backend,
    };
    let result = server::serve(app_state, port).await;

    engine.shutdown().await;
    println!("👋 Server stopped");
    result
}
