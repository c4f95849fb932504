pub mod instruments;
pub mod serve;
pub mod status;
pub mod watch;

use crate::engine::SessionSnapshot;
use crate::error::Result;
use crate::models::{SyncConfig, Symbol};
use crate::services::BackendClient;
use tracing::warn;

/// Symbol to open: explicit flag, then the backend's instrument lists, then the configured default
pub async fn resolve_symbol(
    requested: Option<String>,
    backend: &BackendClient,
    config: &SyncConfig,
) -> Result<Symbol> {
    if let Some(raw) = requested {
        return Symbol::new(raw);
    }

    match backend.instrument_lists().await {
        Ok(lists) => Ok(lists
            .default_symbol()
            .unwrap_or_else(|| config.default_symbol.clone())),
        Err(e) => {
            warn!(error = %e, fallback = %config.default_symbol, "Instrument lists unavailable");
            Ok(config.default_symbol.clone())
        }
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "-".to_string(),
    }
}

/// Multi-line human summary of a snapshot
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = Vec::new();

    out.push(format!(
        "🔹 {} (generation {}, {:?})",
        snapshot.symbol, snapshot.generation, snapshot.phase
    ));
    out.push(format!("   Price:     {}", fmt_opt(snapshot.price, 2)));

    if let Some(market) = &snapshot.market {
        out.push(format!(
            "   24h:       {:+.2}%  high {:.2}  low {:.2}  vol {:.2}M",
            market.change_pct, market.high, market.low, market.quote_volume_millions
        ));
    }

    if let Some(stats) = &snapshot.stats {
        out.push(format!(
            "   Profit:    {:.2}  win rate {:.1}%  trades {}",
            stats.total_profit,
            stats.win_rate,
            stats.total_trades.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
        ));
    }

    let position = &snapshot.position;
    if position.is_positioned {
        out.push(format!(
            "   Position:  entry {}  pnl {}%  stop {}  margin {}%{}",
            fmt_opt(position.entry_price, 2),
            fmt_opt(position.unrealized_pct, 2),
            fmt_opt(position.stop_price, 2),
            fmt_opt(position.stop_distance_pct, 2),
            if position.stop_alert { "  ⚠️ near stop" } else { "" }
        ));
    } else if position.observation_mode {
        out.push("   Position:  flat (observation mode)".to_string());
    } else {
        out.push("   Position:  flat".to_string());
    }

    if let Some(ai) = &snapshot.ai_status {
        out.push(format!(
            "   Brain:     {}  score {:.1}/10  RSI {:.1}",
            ai.decision, ai.score, ai.rsi
        ));
    }

    let candles = snapshot.price_chart.as_ref().map(|v| v.data.len()).unwrap_or(0);
    let markers = snapshot.price_chart.as_ref().map(|v| v.markers.len()).unwrap_or(0);
    let equity = snapshot.equity_chart.as_ref().map(|v| v.data.len()).unwrap_or(0);
    out.push(format!(
        "   Charts:    {} candles, {} markers, {} equity points",
        candles, markers, equity
    ));

    let failing: Vec<String> = snapshot
        .health
        .iter()
        .filter(|(_, h)| h.failures > 0)
        .map(|(group, h)| format!("{} ({})", group, h.failures))
        .collect();
    if !failing.is_empty() {
        out.push(format!("   Failures:  {}", failing.join(", ")));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LiveGeneration, MemorySurfaceFactory, SessionState};
    use crate::services::DataGroup;
    use crate::worker::scripted::ScriptedSource;
    use crate::worker::FetchOutcome;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_render_snapshot_mentions_key_figures() {
        let symbol = Symbol::new("BTC/BRL").unwrap();
        let live = LiveGeneration::new();
        let generation = live.advance();
        let factory = Arc::new(MemorySurfaceFactory::new());
        let mut state = SessionState::new(symbol.clone(), generation, factory);
        state.create_surfaces();
        state.activate();

        let source = ScriptedSource::new();
        for group in DataGroup::ALL {
            state.apply(
                FetchOutcome {
                    generation,
                    symbol: symbol.clone(),
                    group,
                    result: Ok(source.payload(group, &symbol)),
                },
                &live,
            );
        }

        let text = render_snapshot(&state.snapshot());
        assert!(text.contains("BTC/BRL"));
        assert!(text.contains("350000.00"));
        assert!(text.contains("3 candles, 2 markers, 2 equity points"));
        assert!(text.contains("Position:  entry"));
    }

    #[tokio::test]
    async fn test_resolve_symbol_prefers_flag_then_falls_back() {
        let config = SyncConfig::default();
        // Nothing listens on port 9; the lists request fails fast
        let backend = BackendClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();

        let flagged = resolve_symbol(Some("ETH/BRL".to_string()), &backend, &config).await.unwrap();
        assert_eq!(flagged.as_str(), "ETH/BRL");

        let fallback = resolve_symbol(None, &backend, &config).await.unwrap();
        assert_eq!(fallback, config.default_symbol);

        assert!(resolve_symbol(Some(" ".to_string()), &backend, &config).await.is_err());
    }
}
