//! Symbol Session
//!
//! A session binds one symbol and one generation to its fetch cycles and its
//! chart. Fetch outcomes travel over a per-session channel to a publisher task
//! that applies them under the session lock; `SessionState::apply` is the only
//! path from the network to the chart.
//!
//! Phases: `Creating -> Active -> Disposing -> Disposed`. Results are accepted
//! only while `Active` and only when their generation is still the live one.

use crate::engine::chart::{
    ChartContainer, ChartLifecycleManager, ChartOutcome, SeriesData, SurfaceFactory, SurfaceKind,
};
use crate::engine::generation::LiveGeneration;
use crate::engine::markers::MarkerReconciler;
use crate::engine::snapshot::{MarketView, PositionView, SessionSnapshot};
use crate::models::{AiStatus, BotStats, BotStatus, SyncConfig, Symbol, Ticker24h, Trade};
use crate::services::{DataGroup, DataSource, Payload};
use crate::utils::deduplication::EquityDeduplicator;
use crate::worker::{Cadence, FetchCycleController, FetchOutcome, OutcomeReceiver};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Creating,
    Active,
    Disposing,
    Disposed,
}

/// Per data group delivery counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupHealth {
    pub successes: u64,
    pub failures: u64,
    /// Failures that are not transient (bad config, surface refusal)
    pub persistent_failures: u64,
    pub stale_discards: u64,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
}

/// What `apply` did with an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Superseded generation or inactive session; dropped silently
    Stale,
    /// Fetch error; last good value kept
    Failed,
    /// Payload refused by the chart surface; last good value kept
    Rejected,
}

/// Last good value per non-chart group
#[derive(Debug, Clone, Default)]
pub struct LatestValues {
    pub stats: Option<BotStats>,
    pub history: Vec<Trade>,
    pub bot_status: Option<BotStatus>,
    pub price: Option<f64>,
    pub ai_status: Option<AiStatus>,
    pub ticker: Option<Ticker24h>,
}

pub struct SessionState {
    symbol: Symbol,
    generation: u64,
    phase: SessionPhase,
    latest: LatestValues,
    chart: ChartLifecycleManager,
    health: BTreeMap<DataGroup, GroupHealth>,
}

impl SessionState {
    pub fn new(symbol: Symbol, generation: u64, factory: Arc<dyn SurfaceFactory>) -> Self {
        Self {
            symbol,
            generation,
            phase: SessionPhase::Creating,
            latest: LatestValues::default(),
            chart: ChartLifecycleManager::new(factory),
            health: DataGroup::ALL
                .into_iter()
                .map(|g| (g, GroupHealth::default()))
                .collect(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn latest(&self) -> &LatestValues {
        &self.latest
    }

    pub fn chart(&self) -> &ChartLifecycleManager {
        &self.chart
    }

    pub fn health(&self, group: DataGroup) -> GroupHealth {
        self.health.get(&group).cloned().unwrap_or_default()
    }

    /// Allocate both surfaces in their default containers
    pub fn create_surfaces(&mut self) {
        for kind in [SurfaceKind::Candle, SurfaceKind::Area] {
            if let ChartOutcome::Rejected(reason) =
                self.chart.create(&ChartContainer::default_for(kind), kind)
            {
                warn!(
                    symbol = %self.symbol,
                    kind = kind.as_str(),
                    reason = %reason,
                    "Surface not created"
                );
            }
        }
    }

    /// Push the overlay for the current log and start accepting results
    pub fn activate(&mut self) {
        if self.phase != SessionPhase::Creating {
            return;
        }
        self.push_markers();
        self.phase = SessionPhase::Active;
        info!(symbol = %self.symbol, generation = self.generation, "Session active");
    }

    pub fn begin_dispose(&mut self) {
        if matches!(self.phase, SessionPhase::Creating | SessionPhase::Active) {
            self.phase = SessionPhase::Disposing;
        }
    }

    pub fn finish_dispose(&mut self) {
        self.chart.dispose();
        self.phase = SessionPhase::Disposed;
    }

    pub fn resize(&mut self, kind: SurfaceKind, width: u32) -> ChartOutcome {
        self.chart.resize(kind, width)
    }

    fn push_markers(&mut self) -> ChartOutcome {
        let markers = MarkerReconciler::reconcile(&self.latest.history, &self.symbol);
        self.chart.apply_markers(&markers)
    }

    fn is_live(&self, outcome: &FetchOutcome, live: &LiveGeneration) -> bool {
        self.phase == SessionPhase::Active
            && outcome.generation == self.generation
            && live.is_current(outcome.generation)
            && outcome.symbol == self.symbol
    }

    /// Fold one fetch outcome into the session
    pub fn apply(&mut self, outcome: FetchOutcome, live: &LiveGeneration) -> ApplyOutcome {
        let group = outcome.group;

        if !self.is_live(&outcome, live) {
            debug!(
                symbol = %outcome.symbol,
                generation = outcome.generation,
                live_generation = live.current(),
                group = %group,
                "Discarding stale result"
            );
            self.health.entry(group).or_default().stale_discards += 1;
            return ApplyOutcome::Stale;
        }

        let payload = match outcome.result {
            Ok(payload) => payload,
            Err(e) => {
                let transient = e.is_transient();
                if transient {
                    warn!(
                        symbol = %self.symbol,
                        generation = self.generation,
                        group = %group,
                        error = %e,
                        "Fetch failed, keeping last good value"
                    );
                } else {
                    error!(
                        symbol = %self.symbol,
                        generation = self.generation,
                        group = %group,
                        error = %e,
                        "Fetch failed with a non-transient error, keeping last good value"
                    );
                }
                let health = self.health.entry(group).or_default();
                health.failures += 1;
                if !transient {
                    health.persistent_failures += 1;
                }
                health.last_error = Some(e.to_string());
                return ApplyOutcome::Failed;
            }
        };

        let chart = match payload {
            Payload::Stats(stats) => {
                self.latest.stats = Some(stats);
                ChartOutcome::Applied
            }
            Payload::History(trades) => {
                self.latest.history = trades;
                self.push_markers()
            }
            Payload::BotStatus(status) => {
                self.latest.bot_status = status;
                ChartOutcome::Applied
            }
            Payload::Price(price) => {
                self.latest.price = Some(price);
                ChartOutcome::Applied
            }
            Payload::AiStatus(status) => {
                self.latest.ai_status = status;
                ChartOutcome::Applied
            }
            Payload::Ticker(ticker) => {
                self.latest.ticker = Some(ticker);
                ChartOutcome::Applied
            }
            Payload::Candles(candles) => self.chart.update(&SeriesData::Candles(candles)),
            Payload::Equity(raw) => {
                let deduped = EquityDeduplicator::dedup_owned(raw);
                self.chart.update(&SeriesData::Area(deduped))
            }
        };

        let health = self.health.entry(group).or_default();
        match chart {
            ChartOutcome::Applied => {
                health.successes += 1;
                health.last_success = Some(Utc::now());
                ApplyOutcome::Applied
            }
            other => {
                warn!(
                    symbol = %self.symbol,
                    group = %group,
                    outcome = ?other,
                    "Chart refused update, keeping last good series"
                );
                health.failures += 1;
                health.persistent_failures += 1;
                health.last_error = Some(format!("{:?}", other));
                ApplyOutcome::Rejected
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let latest = &self.latest;
        SessionSnapshot {
            symbol: self.symbol.clone(),
            generation: self.generation,
            phase: self.phase,
            stats: latest.stats.clone(),
            history: latest
                .history
                .iter()
                .filter(|t| t.symbol == self.symbol)
                .cloned()
                .collect(),
            bot_status: latest.bot_status.clone(),
            price: latest.price,
            ai_status: latest.ai_status.clone(),
            ticker: latest.ticker.clone(),
            position: PositionView::derive(
                latest.bot_status.as_ref(),
                latest.price,
                latest.stats.as_ref(),
            ),
            market: latest.ticker.as_ref().map(MarketView::from),
            price_chart: self.chart.view(SurfaceKind::Candle),
            equity_chart: self.chart.view(SurfaceKind::Area),
            health: self.health.clone(),
        }
    }
}

async fn publish_outcomes(
    state: Arc<Mutex<SessionState>>,
    live: LiveGeneration,
    mut outcomes: OutcomeReceiver,
) {
    while let Some(outcome) = outcomes.recv().await {
        let mut state = state.lock().await;
        state.apply(outcome, &live);
    }
}

/// A live session: state, fetch cycles and the publisher task
pub struct SymbolSession {
    symbol: Symbol,
    generation: u64,
    state: Arc<Mutex<SessionState>>,
    controllers: Vec<FetchCycleController>,
    publisher: Option<JoinHandle<()>>,
}

impl SymbolSession {
    /// Create surfaces, activate, then start polling
    ///
    /// `generation` must already be the live one.
    pub fn open(
        symbol: Symbol,
        generation: u64,
        config: &SyncConfig,
        source: Arc<dyn DataSource>,
        factory: Arc<dyn SurfaceFactory>,
        live: LiveGeneration,
    ) -> Self {
        let mut state = SessionState::new(symbol.clone(), generation, factory);
        state.create_surfaces();
        state.activate();
        let state = Arc::new(Mutex::new(state));

        let (tx, rx) = mpsc::unbounded_channel();
        let publisher = tokio::spawn(publish_outcomes(Arc::clone(&state), live, rx));

        let mut controllers: Vec<FetchCycleController> = Cadence::ALL
            .into_iter()
            .map(|cadence| {
                FetchCycleController::new(
                    cadence,
                    cadence.period(config),
                    symbol.clone(),
                    generation,
                    Arc::clone(&source),
                    tx.clone(),
                )
            })
            .collect();

        for controller in &mut controllers {
            controller.start();
        }

        Self {
            symbol,
            generation,
            state,
            controllers,
            publisher: Some(publisher),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &Arc<Mutex<SessionState>> {
        &self.state
    }

    /// Stop polling and release the chart; idempotent
    pub async fn dispose(&mut self) {
        let mut state = self.state.lock().await;
        if state.phase() == SessionPhase::Disposed {
            return;
        }
        state.begin_dispose();

        for controller in &mut self.controllers {
            controller.stop();
        }
        if let Some(publisher) = self.publisher.take() {
            publisher.abort();
        }

        state.finish_dispose();
        info!(symbol = %self.symbol, generation = self.generation, "Session disposed");
    }
}

impl Drop for SymbolSession {
    fn drop(&mut self) {
        for controller in &mut self.controllers {
            controller.stop();
        }
        if let Some(publisher) = self.publisher.take() {
            publisher.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory_surface::MemorySurfaceFactory;
    use crate::error::AppError;
    use crate::models::{Candle, EquityPoint};
    use crate::worker::scripted::ScriptedSource;

    fn btc() -> Symbol {
        Symbol::new("BTC/BRL").unwrap()
    }

    fn active_state(live: &LiveGeneration) -> SessionState {
        let generation = live.advance();
        let mut state = SessionState::new(btc(), generation, Arc::new(MemorySurfaceFactory::new()));
        state.create_surfaces();
        state.activate();
        state
    }

    fn outcome(generation: u64, payload: Payload) -> FetchOutcome {
        FetchOutcome {
            generation,
            symbol: btc(),
            group: payload.group(),
            result: Ok(payload),
        }
    }

    #[test]
    fn test_equity_is_deduplicated_before_chart() {
        let live = LiveGeneration::new();
        let mut state = active_state(&live);
        let generation = state.generation();

        let raw = vec![
            EquityPoint::new(100, 10.0),
            EquityPoint::new(100, 12.0),
            EquityPoint::new(90, 5.0),
        ];
        assert_eq!(
            state.apply(outcome(generation, Payload::Equity(raw)), &live),
            ApplyOutcome::Applied
        );

        let view = state.chart().view(SurfaceKind::Area).unwrap();
        assert_eq!(
            view.data,
            SeriesData::Area(vec![EquityPoint::new(90, 5.0), EquityPoint::new(100, 12.0)])
        );
    }

    #[test]
    fn test_superseded_generation_is_discarded() {
        let live = LiveGeneration::new();
        let mut state = active_state(&live);
        let old = state.generation();

        state.apply(outcome(old, Payload::Price(1.0)), &live);
        live.advance();

        assert_eq!(state.apply(outcome(old, Payload::Price(2.0)), &live), ApplyOutcome::Stale);
        assert_eq!(state.latest().price, Some(1.0));
        assert_eq!(state.health(DataGroup::Price).stale_discards, 1);
    }

    #[test]
    fn test_results_ignored_unless_active() {
        let live = LiveGeneration::new();
        let generation = live.advance();
        let mut state = SessionState::new(btc(), generation, Arc::new(MemorySurfaceFactory::new()));

        assert_eq!(
            state.apply(outcome(generation, Payload::Price(1.0)), &live),
            ApplyOutcome::Stale
        );

        state.create_surfaces();
        state.activate();
        assert_eq!(
            state.apply(outcome(generation, Payload::Price(1.0)), &live),
            ApplyOutcome::Applied
        );

        state.begin_dispose();
        assert_eq!(state.phase(), SessionPhase::Disposing);
        assert_eq!(
            state.apply(outcome(generation, Payload::Price(3.0)), &live),
            ApplyOutcome::Stale
        );

        state.finish_dispose();
        assert_eq!(
            state.apply(outcome(generation, Payload::Price(4.0)), &live),
            ApplyOutcome::Stale
        );
        assert_eq!(state.latest().price, Some(1.0));
    }

    #[test]
    fn test_failure_keeps_last_good_value() {
        let live = LiveGeneration::new();
        let mut state = active_state(&live);
        let generation = state.generation();

        state.apply(outcome(generation, Payload::Price(10.0)), &live);
        let failed = FetchOutcome {
            generation,
            symbol: btc(),
            group: DataGroup::Price,
            result: Err(AppError::Network("timeout".to_string())),
        };
        assert_eq!(state.apply(failed, &live), ApplyOutcome::Failed);

        assert_eq!(state.latest().price, Some(10.0));
        let health = state.health(DataGroup::Price);
        assert_eq!(health.successes, 1);
        assert_eq!(health.failures, 1);
        assert_eq!(health.persistent_failures, 0);
        assert!(health.last_error.unwrap().contains("timeout"));
    }

    #[test]
    fn test_non_transient_failure_is_counted_separately() {
        let live = LiveGeneration::new();
        let mut state = active_state(&live);
        let generation = state.generation();

        state.apply(outcome(generation, Payload::Price(10.0)), &live);
        let misconfigured = FetchOutcome {
            generation,
            symbol: btc(),
            group: DataGroup::Price,
            result: Err(AppError::Config("bad exchange url".to_string())),
        };
        assert_eq!(state.apply(misconfigured, &live), ApplyOutcome::Failed);

        assert_eq!(state.latest().price, Some(10.0));
        let health = state.health(DataGroup::Price);
        assert_eq!(health.failures, 1);
        assert_eq!(health.persistent_failures, 1);

        assert_eq!(
            state.apply(outcome(generation, Payload::Price(11.0)), &live),
            ApplyOutcome::Applied
        );
        assert_eq!(state.latest().price, Some(11.0));
    }

    #[test]
    fn test_unsorted_candles_rejected_by_surface() {
        let live = LiveGeneration::new();
        let mut state = active_state(&live);
        let generation = state.generation();

        let good = vec![Candle::new(1, 1.0, 1.0, 1.0, 1.0), Candle::new(2, 1.0, 1.0, 1.0, 1.0)];
        let bad = vec![Candle::new(2, 1.0, 1.0, 1.0, 1.0), Candle::new(2, 1.0, 1.0, 1.0, 1.0)];
        state.apply(outcome(generation, Payload::Candles(good)), &live);

        assert_eq!(
            state.apply(outcome(generation, Payload::Candles(bad)), &live),
            ApplyOutcome::Rejected
        );
        let view = state.chart().view(SurfaceKind::Candle).unwrap();
        assert_eq!(view.data.times(), vec![1, 2]);
        assert_eq!(state.health(DataGroup::Candles).persistent_failures, 1);
    }

    #[test]
    fn test_history_refresh_reconciles_markers() {
        let live = LiveGeneration::new();
        let mut state = active_state(&live);
        let generation = state.generation();

        let markers = state.chart().view(SurfaceKind::Candle).unwrap().markers;
        assert!(markers.is_empty());

        state.apply(outcome(generation, Payload::History(ScriptedSource::mixed_history())), &live);
        let view = state.chart().view(SurfaceKind::Candle).unwrap();
        let ids: Vec<i64> = view.markers.iter().map(|m| m.trade_id).collect();
        assert_eq!(ids, vec![11, 12]);

        let snapshot = state.snapshot();
        assert!(snapshot.history.iter().all(|t| t.symbol == btc()));
        assert_eq!(snapshot.history.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_and_dispose_session() {
        let live = LiveGeneration::new();
        let factory = MemorySurfaceFactory::new();
        let source = ScriptedSource::new();
        let generation = live.advance();

        let mut session = SymbolSession::open(
            btc(),
            generation,
            &SyncConfig::default(),
            source.clone(),
            Arc::new(factory.clone()),
            live.clone(),
        );
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;

        {
            let state = session.state().lock().await;
            assert_eq!(state.phase(), SessionPhase::Active);
            assert_eq!(state.latest().price, Some(ScriptedSource::base_price(&btc())));
            assert_eq!(state.health(DataGroup::Equity).successes, 1);
        }
        assert_eq!(factory.counters().created, 2);

        session.dispose().await;
        session.dispose().await;
        assert_eq!(session.state().lock().await.phase(), SessionPhase::Disposed);
        assert_eq!(factory.counters().removed, 2);

        let calls = source.calls(DataGroup::Price, &btc());
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        assert_eq!(source.calls(DataGroup::Price, &btc()), calls);
    }
}
