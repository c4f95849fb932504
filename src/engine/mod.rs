//! Polling & Chart-Sync Engine
//!
//! `SyncEngine` owns the single live `SymbolSession`. Each session owns its fetch
//! cycles and its `ChartLifecycleManager`; a `LiveGeneration` shared by all of them
//! decides which results may still reach a chart.

pub mod chart;
pub mod generation;
pub mod markers;
pub mod memory_surface;
pub mod session;
pub mod snapshot;
pub mod sync_engine;

pub use chart::{
    ChartContainer, ChartLifecycleManager, ChartOutcome, ChartSurface, SeriesData,
    SurfaceCounters, SurfaceFactory, SurfaceKind, SurfaceView,
};
pub use generation::LiveGeneration;
pub use markers::MarkerReconciler;
pub use memory_surface::{MemorySurface, MemorySurfaceFactory};
pub use session::{ApplyOutcome, GroupHealth, SessionPhase, SessionState, SymbolSession};
pub use snapshot::{MarketView, PositionView, SessionSnapshot};
pub use sync_engine::{EngineHealth, SyncEngine};
