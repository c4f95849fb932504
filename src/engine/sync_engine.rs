use crate::engine::chart::{ChartOutcome, SurfaceCounters, SurfaceFactory, SurfaceKind};
use crate::engine::generation::LiveGeneration;
use crate::engine::session::{GroupHealth, SessionPhase, SymbolSession};
use crate::engine::snapshot::SessionSnapshot;
use crate::models::{SyncConfig, Symbol};
use crate::services::{DataGroup, DataSource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Engine-level counters for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EngineHealth {
    pub symbol: Option<Symbol>,
    pub generation: u64,
    pub phase: Option<SessionPhase>,
    pub switches: u64,
    pub surfaces: SurfaceCounters,
    pub groups: BTreeMap<DataGroup, GroupHealth>,
}

/// Holds at most one live `SymbolSession` and swaps it on symbol changes
///
/// The session slot lock is held for the whole switch, so readers see either the
/// old session or the fully activated new one, never a mix.
pub struct SyncEngine {
    config: SyncConfig,
    source: Arc<dyn DataSource>,
    factory: Arc<dyn SurfaceFactory>,
    live: LiveGeneration,
    session: Mutex<Option<SymbolSession>>,
    switches: AtomicU64,
}

impl SyncEngine {
    pub fn new(
        config: SyncConfig,
        source: Arc<dyn DataSource>,
        factory: Arc<dyn SurfaceFactory>,
    ) -> Self {
        Self {
            config,
            source,
            factory,
            live: LiveGeneration::new(),
            session: Mutex::new(None),
            switches: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.live.current()
    }

    /// Replace the live session with one for `symbol`; returns its generation
    ///
    /// Selecting the symbol that is already live keeps the current session.
    pub async fn switch_to(&self, symbol: Symbol) -> u64 {
        let mut slot = self.session.lock().await;

        if let Some(current) = slot.as_ref() {
            if current.symbol() == &symbol {
                return current.generation();
            }
        }

        let generation = self.live.advance();
        let previous = slot.as_ref().map(|s| s.symbol().clone());

        if let Some(mut old) = slot.take() {
            old.dispose().await;
        }

        *slot = Some(SymbolSession::open(
            symbol.clone(),
            generation,
            &self.config,
            Arc::clone(&self.source),
            Arc::clone(&self.factory),
            self.live.clone(),
        ));
        self.switches.fetch_add(1, Ordering::AcqRel);

        info!(
            from = ?previous.as_ref().map(Symbol::as_str),
            to = %symbol,
            generation,
            "Switched symbol"
        );
        generation
    }

    pub async fn current_symbol(&self) -> Option<Symbol> {
        self.session.lock().await.as_ref().map(|s| s.symbol().clone())
    }

    /// Snapshot of whatever session is live
    pub async fn current_snapshot(&self) -> Option<SessionSnapshot> {
        let slot = self.session.lock().await;
        let session = slot.as_ref()?;
        let state = session.state().lock().await;
        Some(state.snapshot())
    }

    /// Snapshot for `symbol`, or `None` if another symbol is live
    pub async fn snapshot(&self, symbol: &Symbol) -> Option<SessionSnapshot> {
        self.current_snapshot()
            .await
            .filter(|snapshot| &snapshot.symbol == symbol)
    }

    /// Forward a container width change to the live chart
    pub async fn resize(&self, kind: SurfaceKind, width: u32) -> ChartOutcome {
        let slot = self.session.lock().await;
        match slot.as_ref() {
            Some(session) => session.state().lock().await.resize(kind, width),
            None => ChartOutcome::Missing,
        }
    }

    pub async fn health(&self) -> EngineHealth {
        let slot = self.session.lock().await;
        let (symbol, phase, groups) = match slot.as_ref() {
            Some(session) => {
                let state = session.state().lock().await;
                let groups = DataGroup::ALL
                    .into_iter()
                    .map(|g| (g, state.health(g)))
                    .collect();
                (Some(session.symbol().clone()), Some(state.phase()), groups)
            }
            None => (None, None, BTreeMap::new()),
        };

        EngineHealth {
            symbol,
            generation: self.live.current(),
            phase,
            switches: self.switches.load(Ordering::Acquire),
            surfaces: self.factory.counters(),
            groups,
        }
    }

    /// Dispose the live session, leaving the engine empty
    pub async fn shutdown(&self) {
        let mut slot = self.session.lock().await;
        self.live.advance();
        if let Some(mut session) = slot.take() {
            session.dispose().await;
        }
    }
}
