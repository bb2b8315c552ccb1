//! Duration recorder.
//!
//! Buckets are fixed in microseconds to avoid floating point math and are
//! cumulative. A measurement in flight is represented by [`TimerContext`]:
//! stopping it records the elapsed duration exactly once; dropping it without
//! stopping records nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s
pub(crate) const BUCKETS_MICROS: [u64; 9] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000,
];

pub struct Timer {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: [AtomicU64; 9],
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one elapsed duration.
    pub fn record(&self, elapsed: Duration) {
        let micros = elapsed.as_micros() as u64;

        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);

        for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= le {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Begin one measurement. Stop the returned context to record it.
    pub fn start(self: Arc<Self>) -> TimerContext {
        TimerContext {
            timer: self,
            started: Instant::now(),
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum_micros(&self) -> u64 {
        self.sum_micros.load(Ordering::Relaxed)
    }

    pub(crate) fn bucket_counts(&self) -> [u64; 9] {
        std::array::from_fn(|i| self.buckets[i].load(Ordering::Relaxed))
    }
}

/// In-flight measurement token. Owned by exactly one request between its
/// entry and exit hooks.
pub struct TimerContext {
    timer: Arc<Timer>,
    started: Instant,
}

impl TimerContext {
    /// Stop the measurement, recording the elapsed duration.
    pub fn stop(self) -> Duration {
        let elapsed = self.started.elapsed();
        self.timer.record(elapsed);
        elapsed
    }
}
