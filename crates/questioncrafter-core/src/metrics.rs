//! Process-wide atomic counters.
//!
//! Counters are bumped at the call site; [`Metrics::flush`] emits the current
//! values as one `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    model_calls: AtomicU64,
    repair_requests: AtomicU64,
    answer_fallbacks: AtomicU64,
    refinements_completed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            model_calls: AtomicU64::new(0),
            repair_requests: AtomicU64::new(0),
            answer_fallbacks: AtomicU64::new(0),
            refinements_completed: AtomicU64::new(0),
        }
    }

    pub fn inc_model_calls(&self) {
        self.model_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "model_calls", "counter incremented");
    }

    pub fn inc_repair_requests(&self) {
        self.repair_requests.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "repair_requests", "counter incremented");
    }

    pub fn inc_answer_fallbacks(&self) {
        self.answer_fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "answer_fallbacks", "counter incremented");
    }

    pub fn inc_refinements_completed(&self) {
        self.refinements_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "refinements_completed", "counter incremented");
    }

    /// Emit all counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            model_calls = self.model_calls(),
            repair_requests = self.repair_requests(),
            answer_fallbacks = self.answer_fallbacks(),
            refinements_completed = self.refinements_completed(),
        );
    }

    pub fn model_calls(&self) -> u64 {
        self.model_calls.load(Ordering::Relaxed)
    }

    pub fn repair_requests(&self) -> u64 {
        self.repair_requests.load(Ordering::Relaxed)
    }

    pub fn answer_fallbacks(&self) -> u64 {
        self.answer_fallbacks.load(Ordering::Relaxed)
    }

    pub fn refinements_completed(&self) -> u64 {
        self.refinements_completed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Local instance: the global is shared with other tests running in parallel.
    #[test]
    fn counters_increment_independently() {
        let m = Metrics::new();
        m.inc_model_calls();
        m.inc_model_calls();
        m.inc_repair_requests();
        assert_eq!(m.model_calls(), 2);
        assert_eq!(m.repair_requests(), 1);
        assert_eq!(m.answer_fallbacks(), 0);
        assert_eq!(m.refinements_completed(), 0);
        m.flush();
    }
}
