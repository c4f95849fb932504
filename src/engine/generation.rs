use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Engine-wide session counter
///
/// Advanced once per session creation. A result is live only while its tag equals
/// `current()`; every clone observes the same counter.
#[derive(Debug, Clone, Default)]
pub struct LiveGeneration(Arc<AtomicU64>);

impl LiveGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede every outstanding generation and return the new one
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}
