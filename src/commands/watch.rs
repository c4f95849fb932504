use crate::commands::{render_snapshot, resolve_symbol};
use crate::engine::{MemorySurfaceFactory, SyncEngine};
use crate::error::{AppError, Result};
use crate::models::SyncConfig;
use crate::services::HttpDataSource;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(config: SyncConfig, symbol: Option<String>, every: u64) -> Result<()> {
    if every == 0 {
        return Err(AppError::InvalidInput("--every must be at least 1 second".to_string()));
    }

    let source = HttpDataSource::from_config(&config)?;
    let symbol = resolve_symbol(symbol, source.backend(), &config).await?;

    println!("👀 Watching {} (every {}s, Ctrl-C to stop)\n", symbol, every);

    let engine = SyncEngine::new(config, Arc::new(source), Arc::new(MemorySurfaceFactory::new()));
    engine.switch_to(symbol).await;

    let mut interval = tokio::time::interval(Duration::from_secs(every));
    // Let the first fetches land before the first print
    interval.reset();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(snapshot) = engine.current_snapshot().await {
                    println!("{}\n", render_snapshot(&snapshot));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    engine.shutdown().await;
    println!("👋 Stopped");
    Ok(())
}
