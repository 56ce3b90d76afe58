//! Pipeline counters exposed as read-only snapshots.
//!
//! Counters are lock-free atomics updated on the request path; the external
//! monitoring collaborator only ever sees an immutable [`MetricsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Shared counters for the understanding pipeline.
#[derive(Default)]
pub struct EngineMetrics {
    classifications: AtomicU64,
    fallbacks: AtomicU64,
    /// Confidence sum in thousandths, so the average survives atomic math.
    confidence_milli_sum: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one classification; returns the running total so the caller
    /// can drive counter-based triggers like weight autosave.
    pub fn record_classification(&self, confidence: f32, used_fallback: bool) -> u64 {
        let total = self.classifications.fetch_add(1, Ordering::Relaxed) + 1;
        if used_fallback {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        let milli = (confidence.clamp(0.0, 1.0) * 1000.0).round() as u64;
        self.confidence_milli_sum.fetch_add(milli, Ordering::Relaxed);
        total
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self, active_sessions: usize) -> MetricsSnapshot {
        let classifications = self.classifications.load(Ordering::Relaxed);
        let milli_sum = self.confidence_milli_sum.load(Ordering::Relaxed);
        let average_confidence = if classifications == 0 {
            0.0
        } else {
            milli_sum as f32 / 1000.0 / classifications as f32
        };

        MetricsSnapshot {
            classifications,
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            average_confidence,
            active_sessions,
        }
    }
}

/// Read-only metrics view for the monitoring boundary.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub classifications: u64,
    pub fallbacks: u64,
    pub average_confidence: f32,
    pub active_sessions: usize,
}
