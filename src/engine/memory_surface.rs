use crate::engine::chart::{
    ChartContainer, ChartSurface, SeriesData, SurfaceCounters, SurfaceFactory, SurfaceKind,
    SurfaceView,
};
use crate::error::{AppError, Result};
use crate::models::Marker;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory render model served to the external UI through snapshots
pub struct MemorySurface {
    kind: SurfaceKind,
    container: ChartContainer,
    data: SeriesData,
    markers: Vec<Marker>,
    data_revision: u64,
    marker_revision: u64,
    removed: Option<Arc<AtomicUsize>>,
}

impl MemorySurface {
    fn ensure_live(&self) -> Result<()> {
        if self.removed.is_none() {
            return Err(AppError::Surface(format!(
                "{} surface '{}' was removed",
                self.kind.as_str(),
                self.container.id
            )));
        }
        Ok(())
    }
}

impl ChartSurface for MemorySurface {
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn set_data(&mut self, data: &SeriesData) -> Result<()> {
        self.ensure_live()?;

        if data.kind() != self.kind {
            return Err(AppError::Surface(format!(
                "Cannot set {} data on a {} surface",
                data.kind().as_str(),
                self.kind.as_str()
            )));
        }

        let times = data.times();
        if let Some(pair) = times.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(AppError::Surface(format!(
                "Data must be asc ordered by time: {} followed by {}",
                pair[0], pair[1]
            )));
        }

        self.data = data.clone();
        self.data_revision += 1;
        Ok(())
    }

    fn set_markers(&mut self, markers: &[Marker]) -> Result<()> {
        self.ensure_live()?;

        if self.kind != SurfaceKind::Candle {
            return Err(AppError::Surface(
                "Markers are only supported on candle surfaces".to_string(),
            ));
        }

        if let Some(pair) = markers.windows(2).find(|pair| pair[0].time > pair[1].time) {
            return Err(AppError::Surface(format!(
                "Markers must be asc ordered by time: {} followed by {}",
                pair[0].time, pair[1].time
            )));
        }

        self.markers = markers.to_vec();
        self.marker_revision += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32) {
        self.container.width = width;
    }

    fn view(&self) -> SurfaceView {
        SurfaceView {
            kind: self.kind,
            container: self.container.clone(),
            data: self.data.clone(),
            markers: self.markers.clone(),
            data_revision: self.data_revision,
            marker_revision: self.marker_revision,
        }
    }

    fn remove(&mut self) {
        if let Some(removed) = self.removed.take() {
            removed.fetch_add(1, Ordering::AcqRel);
        }
    }
}

/// Builds `MemorySurface`s and counts allocations, shared across sessions
#[derive(Debug, Clone, Default)]
pub struct MemorySurfaceFactory {
    created: Arc<AtomicUsize>,
    removed: Arc<AtomicUsize>,
}

impl MemorySurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SurfaceFactory for MemorySurfaceFactory {
    fn create(
        &self,
        container: &ChartContainer,
        kind: SurfaceKind,
    ) -> Result<Box<dyn ChartSurface>> {
        if container.width == 0 || container.height == 0 {
            return Err(AppError::Surface(format!(
                "Container '{}' has no area ({}x{})",
                container.id, container.width, container.height
            )));
        }

        self.created.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(MemorySurface {
            kind,
            container: container.clone(),
            data: SeriesData::empty(kind),
            markers: Vec::new(),
            data_revision: 0,
            marker_revision: 0,
            removed: Some(Arc::clone(&self.removed)),
        }))
    }

    fn counters(&self) -> SurfaceCounters {
        SurfaceCounters {
            created: self.created.load(Ordering::Acquire),
            removed: self.removed.load(Ordering::Acquire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquityPoint, MarkerPosition, MarkerShape, TradeSide};

    fn surface(kind: SurfaceKind) -> Box<dyn ChartSurface> {
        MemorySurfaceFactory::new()
            .create(&ChartContainer::default_for(kind), kind)
            .unwrap()
    }

    fn marker(time: i64) -> Marker {
        Marker {
            time,
            side: TradeSide::Sell,
            position: MarkerPosition::AboveBar,
            shape: MarkerShape::ArrowDown,
            color: "#ef4444".to_string(),
            text: "Sell".to_string(),
            trade_id: 1,
        }
    }

    #[test]
    fn test_area_rejects_duplicate_times() {
        let mut area = surface(SurfaceKind::Area);
        let dup = SeriesData::Area(vec![EquityPoint::new(100, 10.0), EquityPoint::new(100, 12.0)]);
        assert!(matches!(area.set_data(&dup), Err(AppError::Surface(_))));
        assert!(area.view().data.is_empty());
        assert_eq!(area.view().data_revision, 0);
    }

    #[test]
    fn test_kind_mismatch_and_markers_on_area() {
        let mut area = surface(SurfaceKind::Area);
        assert!(area.set_data(&SeriesData::Candles(vec![])).is_err());
        assert!(area.set_markers(&[marker(1)]).is_err());
    }

    #[test]
    fn test_markers_allow_equal_times_but_not_descending() {
        let mut candle = surface(SurfaceKind::Candle);
        candle.set_markers(&[marker(1), marker(1), marker(2)]).unwrap();
        assert_eq!(candle.view().markers.len(), 3);

        assert!(candle.set_markers(&[marker(3), marker(2)]).is_err());
        // Previous overlay remains in full
        assert_eq!(candle.view().markers.len(), 3);
        assert_eq!(candle.view().marker_revision, 1);
    }

    #[test]
    fn test_removed_surface_refuses_writes() {
        let factory = MemorySurfaceFactory::new();
        let kind = SurfaceKind::Candle;
        let mut candle = factory.create(&ChartContainer::default_for(kind), kind).unwrap();
        candle.remove();
        candle.remove();
        assert_eq!(factory.counters(), SurfaceCounters { created: 1, removed: 1 });
        assert!(candle.set_markers(&[]).is_err());
    }

    #[test]
    fn test_zero_area_container_rejected() {
        let factory = MemorySurfaceFactory::new();
        let result = factory.create(&ChartContainer::new("hidden", 0, 300), SurfaceKind::Candle);
        assert!(result.is_err());
        assert_eq!(factory.counters().created, 0);
    }
}
