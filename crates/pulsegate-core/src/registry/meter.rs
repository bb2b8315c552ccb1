//! Invocation-rate counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts events. Safe under concurrent access; increments are never lost.
#[derive(Debug, Default)]
pub struct Meter {
    count: AtomicU64,
}

impl Meter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event.
    pub fn mark(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
