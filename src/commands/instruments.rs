use crate::error::Result;
use crate::models::SyncConfig;
use crate::services::BackendClient;

pub async fn run(config: SyncConfig) -> Result<()> {
    let backend = BackendClient::new(&config.api_url, config.request_timeout)?;
    let lists = backend.instrument_lists().await?;

    println!("⭐ Elite ({})", lists.elite.len());
    for symbol in &lists.elite {
        println!("   {}", symbol);
    }

    println!("\n🔎 Scan results ({})", lists.scan.len());
    for result in &lists.scan {
        println!(
            "   {:<12} {:>+8.2}%  {}",
            result.symbol.as_str(),
            result.profit_pct,
            result.decision
        );
    }

    match lists.default_symbol() {
        Some(symbol) => println!("\n💡 Default symbol: {}", symbol),
        None => println!("\n💡 No instruments listed, default symbol: {}", config.default_symbol),
    }

    Ok(())
}
