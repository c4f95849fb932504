//! Chart Lifecycle Manager
//!
//! Owns the two persistent surfaces of a session: the candle (price) surface and
//! the area (equity) surface. Data refreshes replace series in place, the marker
//! overlay is swapped as a whole, and resizes only change width. Surfaces are
//! released exclusively through `dispose`, which the session calls on a symbol
//! switch. Any call after `dispose` is a no-op reported as `ChartOutcome::Disposed`.

use crate::constants::container;
use crate::error::Result;
use crate::models::{Candle, EquityPoint, Marker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// Candlestick series with the trade marker overlay
    Candle,
    /// Area series for the equity curve
    Area,
}

impl SurfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceKind::Candle => "candle",
            SurfaceKind::Area => "area",
        }
    }
}

impl std::str::FromStr for SurfaceKind {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "candle" | "price" => Ok(SurfaceKind::Candle),
            "area" | "equity" => Ok(SurfaceKind::Area),
            other => Err(crate::error::AppError::InvalidInput(format!(
                "Unknown surface '{}'. Expected candle/price or area/equity",
                other
            ))),
        }
    }
}

/// Full series for one surface; every refresh replaces it wholesale
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "points", rename_all = "snake_case")]
pub enum SeriesData {
    Candles(Vec<Candle>),
    Area(Vec<EquityPoint>),
}

impl SeriesData {
    pub fn empty(kind: SurfaceKind) -> Self {
        match kind {
            SurfaceKind::Candle => SeriesData::Candles(Vec::new()),
            SurfaceKind::Area => SeriesData::Area(Vec::new()),
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        match self {
            SeriesData::Candles(_) => SurfaceKind::Candle,
            SeriesData::Area(_) => SurfaceKind::Area,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesData::Candles(c) => c.len(),
            SeriesData::Area(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn times(&self) -> Vec<i64> {
        match self {
            SeriesData::Candles(c) => c.iter().map(|c| c.time).collect(),
            SeriesData::Area(p) => p.iter().map(|p| p.time).collect(),
        }
    }
}

/// Host element a surface is mounted in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartContainer {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl ChartContainer {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }

    /// Default container for a surface kind (price 800x300, equity 800x200)
    pub fn default_for(kind: SurfaceKind) -> Self {
        match kind {
            SurfaceKind::Candle => Self::new(
                container::PRICE_ID,
                container::PRICE_WIDTH,
                container::PRICE_HEIGHT,
            ),
            SurfaceKind::Area => Self::new(
                container::EQUITY_ID,
                container::EQUITY_WIDTH,
                container::EQUITY_HEIGHT,
            ),
        }
    }
}

/// Read-only render state of one surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceView {
    pub kind: SurfaceKind,
    pub container: ChartContainer,
    pub data: SeriesData,
    pub markers: Vec<Marker>,
    /// Number of accepted `set_data` calls
    pub data_revision: u64,
    /// Number of accepted overlay replacements
    pub marker_revision: u64,
}

/// Surfaces allocated and released over the process lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SurfaceCounters {
    pub created: usize,
    pub removed: usize,
}

impl SurfaceCounters {
    pub fn live(&self) -> usize {
        self.created.saturating_sub(self.removed)
    }
}

/// A persistent visual surface
///
/// Implementations enforce the renderer preconditions: strictly increasing data
/// timestamps, non-decreasing marker timestamps, markers only on candle surfaces.
/// A rejected call must leave the previous state untouched.
pub trait ChartSurface: Send {
    fn kind(&self) -> SurfaceKind;
    fn set_data(&mut self, data: &SeriesData) -> Result<()>;
    fn set_markers(&mut self, markers: &[Marker]) -> Result<()>;
    fn resize(&mut self, width: u32);
    fn view(&self) -> SurfaceView;
    fn remove(&mut self);
}

pub trait SurfaceFactory: Send + Sync {
    fn create(
        &self,
        container: &ChartContainer,
        kind: SurfaceKind,
    ) -> Result<Box<dyn ChartSurface>>;
    fn counters(&self) -> SurfaceCounters;
}

/// Result of a lifecycle call; misuse is reported, never raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum ChartOutcome {
    Applied,
    /// The manager was disposed; the call did nothing
    Disposed,
    /// The target surface was never created
    Missing,
    /// The surface refused the call; previous state kept
    Rejected(String),
}

impl ChartOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ChartOutcome::Applied)
    }
}

pub struct ChartLifecycleManager {
    factory: Arc<dyn SurfaceFactory>,
    price: Option<Box<dyn ChartSurface>>,
    equity: Option<Box<dyn ChartSurface>>,
    disposed: bool,
}

impl ChartLifecycleManager {
    pub fn new(factory: Arc<dyn SurfaceFactory>) -> Self {
        Self {
            factory,
            price: None,
            equity: None,
            disposed: false,
        }
    }

    fn slot(&mut self, kind: SurfaceKind) -> &mut Option<Box<dyn ChartSurface>> {
        match kind {
            SurfaceKind::Candle => &mut self.price,
            SurfaceKind::Area => &mut self.equity,
        }
    }

    fn slot_ref(&self, kind: SurfaceKind) -> Option<&dyn ChartSurface> {
        match kind {
            SurfaceKind::Candle => self.price.as_deref(),
            SurfaceKind::Area => self.equity.as_deref(),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn has_surface(&self, kind: SurfaceKind) -> bool {
        self.slot_ref(kind).is_some()
    }

    /// Allocate the surface for `kind`; at most once per manager
    pub fn create(&mut self, container: &ChartContainer, kind: SurfaceKind) -> ChartOutcome {
        if self.disposed {
            debug!(kind = kind.as_str(), "create after dispose ignored");
            return ChartOutcome::Disposed;
        }
        if self.has_surface(kind) {
            debug!(kind = kind.as_str(), "Surface already exists, keeping it");
            return ChartOutcome::Applied;
        }

        match self.factory.create(container, kind) {
            Ok(surface) => {
                info!(kind = kind.as_str(), container = %container.id, "Created chart surface");
                *self.slot(kind) = Some(surface);
                ChartOutcome::Applied
            }
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "Failed to create chart surface");
                ChartOutcome::Rejected(e.to_string())
            }
        }
    }

    /// Replace the series of the matching surface in place
    pub fn update(&mut self, data: &SeriesData) -> ChartOutcome {
        if self.disposed {
            debug!(kind = data.kind().as_str(), "update after dispose ignored");
            return ChartOutcome::Disposed;
        }
        let Some(surface) = self.slot(data.kind()).as_mut() else {
            return ChartOutcome::Missing;
        };

        match surface.set_data(data) {
            Ok(()) => ChartOutcome::Applied,
            Err(e) => ChartOutcome::Rejected(e.to_string()),
        }
    }

    /// Swap the marker overlay on the price surface
    pub fn apply_markers(&mut self, markers: &[Marker]) -> ChartOutcome {
        if self.disposed {
            debug!("apply_markers after dispose ignored");
            return ChartOutcome::Disposed;
        }
        let Some(surface) = self.price.as_mut() else {
            return ChartOutcome::Missing;
        };

        match surface.set_markers(markers) {
            Ok(()) => ChartOutcome::Applied,
            Err(e) => ChartOutcome::Rejected(e.to_string()),
        }
    }

    /// Track a container width change; never reallocates
    pub fn resize(&mut self, kind: SurfaceKind, width: u32) -> ChartOutcome {
        if self.disposed {
            return ChartOutcome::Disposed;
        }
        if width == 0 {
            return ChartOutcome::Rejected("Width must be positive".to_string());
        }
        let Some(surface) = self.slot(kind).as_mut() else {
            return ChartOutcome::Missing;
        };

        surface.resize(width);
        ChartOutcome::Applied
    }

    /// Release both surfaces; safe without a prior `create` and safe to repeat
    pub fn dispose(&mut self) -> ChartOutcome {
        if self.disposed {
            return ChartOutcome::Disposed;
        }
        self.disposed = true;

        for kind in [SurfaceKind::Candle, SurfaceKind::Area] {
            if let Some(mut surface) = self.slot(kind).take() {
                surface.remove();
                debug!(kind = kind.as_str(), "Removed chart surface");
            }
        }
        ChartOutcome::Applied
    }

    pub fn view(&self, kind: SurfaceKind) -> Option<SurfaceView> {
        self.slot_ref(kind).map(|surface| surface.view())
    }
}

impl Drop for ChartLifecycleManager {
    fn drop(&mut self) {
        self.dispose();
    }
}
