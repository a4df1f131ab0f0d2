//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Orchestrator (conversions by outcome, duration, stale outputs)
//! - Progress forwarding (forwarded, unchanged, dropped, canceled)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// =============================================================================
// Orchestrator
// =============================================================================

/// Conversions by terminal state.
pub static CONVERSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("squeezer_conversions_total", "Total conversion jobs"),
        &["state"], // "succeeded", "failed", "canceled"
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "squeezer_conversion_duration_seconds",
            "Duration of conversion jobs",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["state"],
    )
    .unwrap()
});

/// Stale output files deleted while preparing jobs.
pub static STALE_OUTPUTS_DELETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "squeezer_stale_outputs_deleted_total",
        "Leftover output files deleted before a conversion",
    )
    .unwrap()
});

// =============================================================================
// Progress
// =============================================================================

/// Encoder progress callbacks by what happened to them.
pub static PROGRESS_EVENTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "squeezer_progress_callbacks_total",
            "Encoder progress callbacks received",
        ),
        &["result"], // "forwarded", "unchanged", "dropped", "canceled"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONVERSIONS.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(STALE_OUTPUTS_DELETED.clone()),
        Box::new(PROGRESS_EVENTS.clone()),
    ]
}

/// Registers all core metrics in `registry`.
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();

        CONVERSIONS.with_label_values(&["succeeded"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "squeezer_conversions_total"));

        // registering twice is rejected
        assert!(register_metrics(&registry).is_err());
    }
}
