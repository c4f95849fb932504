//! Equity Curve Deduplication
//!
//! The backend recomputes the equity curve on every poll, so a single response can
//! repeat timestamps or arrive out of order. Chart surfaces reject both, and this
//! module is the one place that enforces strictly increasing, unique timestamps
//! before a series reaches a surface.

use crate::models::EquityPoint;
use std::collections::BTreeMap;

/// Collapses an equity series to one point per timestamp (last write wins)
pub struct EquityDeduplicator;

impl EquityDeduplicator {
    /// Deduplicate and sort a raw series
    ///
    /// For repeated timestamps the value that appears latest in `points` is kept,
    /// since later entries are the most recently computed. Output timestamps are
    /// strictly increasing.
    pub fn dedup(points: &[EquityPoint]) -> Vec<EquityPoint> {
        let mut by_time: BTreeMap<i64, f64> = BTreeMap::new();

        for point in points {
            by_time.insert(point.time, point.value);
        }

        by_time
            .into_iter()
            .map(|(time, value)| EquityPoint::new(time, value))
            .collect()
    }

    /// Owned variant for call sites that no longer need the raw series
    pub fn dedup_owned(points: Vec<EquityPoint>) -> Vec<EquityPoint> {
        Self::dedup(&points)
    }
}
