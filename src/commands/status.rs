use crate::commands::{render_snapshot, resolve_symbol};
use crate::engine::{LiveGeneration, MemorySurfaceFactory, SessionState};
use crate::error::Result;
use crate::models::SyncConfig;
use crate::services::{DataGroup, DataSource, HttpDataSource};
use crate::worker::FetchOutcome;
use std::sync::Arc;
use tokio::task::JoinSet;

/// One pass over every data group, folded through the same session path the engine uses
pub async fn run(config: SyncConfig, symbol: Option<String>) -> Result<()> {
    let source = HttpDataSource::from_config(&config)?;
    let symbol = resolve_symbol(symbol, source.backend(), &config).await?;

    println!("📊 Status for {}\n", symbol);

    let live = LiveGeneration::new();
    let generation = live.advance();
    let factory = Arc::new(MemorySurfaceFactory::new());
    let mut state = SessionState::new(symbol.clone(), generation, factory);
    state.create_surfaces();
    state.activate();

    let mut requests = JoinSet::new();
    for group in DataGroup::ALL {
        let request = source.fetch(group, &symbol);
        requests.spawn(async move { (group, request.await) });
    }

    while let Some(joined) = requests.join_next().await {
        let (group, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("⚠️  Fetch task failed: {}", e);
                continue;
            }
        };
        if let Err(e) = &result {
            eprintln!("⚠️  {}: {}", group, e);
        }
        state.apply(
            FetchOutcome {
                generation,
                symbol: symbol.clone(),
                group,
                result,
            },
            &live,
        );
    }

    println!("{}", render_snapshot(&state.snapshot()));
    Ok(())
}
