//! Shared metric registry.
//!
//! Handles are created lazily and keyed by resolved identifier. `DashMap`
//! entry semantics guarantee at-most-one handle per identifier even under
//! concurrent registration; mutation goes through atomics, so callers never
//! take a lock. Handles are shared by `Arc` across every handler that
//! resolves to the same identifier.

pub mod meter;
pub mod timer;

pub use meter::Meter;
pub use timer::{Timer, TimerContext};

use std::fmt::Write;
use std::sync::Arc;

use dashmap::DashMap;

use timer::BUCKETS_MICROS;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

#[derive(Default)]
pub struct MetricRegistry {
    timers: DashMap<String, Arc<Timer>>,
    meters: DashMap<String, Arc<Meter>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the duration recorder registered under `id`.
    pub fn timer(&self, id: &str) -> Arc<Timer> {
        self.timers
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Timer::new()))
            .value()
            .clone()
    }

    /// Get or create the rate counter registered under `id`.
    pub fn meter(&self, id: &str) -> Arc<Meter> {
        self.meters
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Meter::new()))
            .value()
            .clone()
    }

    /// Look up a timer without creating it.
    pub fn find_timer(&self, id: &str) -> Option<Arc<Timer>> {
        self.timers.get(id).map(|r| r.value().clone())
    }

    /// Look up a meter without creating it.
    pub fn find_meter(&self, id: &str) -> Option<Arc<Meter>> {
        self.meters.get(id).map(|r| r.value().clone())
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn meter_count(&self) -> usize {
        self.meters.len()
    }

    /// Render all registered metrics in Prometheus-style text. The resolved
    /// identifier rides in the `metric` label; timers render as cumulative
    /// histograms in microseconds.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# TYPE pulsegate_invocations_total counter");
        for r in self.meters.iter() {
            let _ = writeln!(
                out,
                "pulsegate_invocations_total{{metric=\"{}\"}} {}",
                escape_label(r.key()),
                r.value().count()
            );
        }

        let _ = writeln!(out, "# TYPE pulsegate_request_duration_micros histogram");
        for r in self.timers.iter() {
            let label = escape_label(r.key());
            let t = r.value();
            let buckets = t.bucket_counts();
            for (i, le) in BUCKETS_MICROS.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "pulsegate_request_duration_micros_bucket{{metric=\"{label}\",le=\"{le}\"}} {}",
                    buckets[i]
                );
            }
            let _ = writeln!(
                out,
                "pulsegate_request_duration_micros_bucket{{metric=\"{label}\",le=\"+Inf\"}} {}",
                t.count()
            );
            let _ = writeln!(
                out,
                "pulsegate_request_duration_micros_sum{{metric=\"{label}\"}} {}",
                t.sum_micros()
            );
            let _ = writeln!(
                out,
                "pulsegate_request_duration_micros_count{{metric=\"{label}\"}} {}",
                t.count()
            );
        }

        out
    }
}
