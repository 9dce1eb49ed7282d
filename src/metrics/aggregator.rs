//! Process-wide protection counters.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

/// Well-known counter names.
///
/// The aggregator accepts any name; these are the ones the engine
/// increments and the exporter publishes.
pub mod counter {
    /// Frames that received any protection.
    pub const FRAMES_PROTECTED: &str = "total_frames_protected";
    /// Canvas pixel buffers and exports perturbed.
    pub const CANVAS_OPERATIONS_SPOOFED: &str = "canvas_operations_spoofed";
    /// WebGL parameter values substituted.
    pub const WEBGL_PARAMETERS_SPOOFED: &str = "webgl_parameters_spoofed";
    /// Navigator property reads answered with spoofed values.
    pub const NAVIGATOR_PROPERTIES_SPOOFED: &str = "navigator_properties_spoofed";
    /// Automation marker probes hidden.
    pub const WEBDRIVER_DETECTIONS_BLOCKED: &str = "webdriver_detections_blocked";
    /// Audio buffers perturbed.
    pub const AUDIO_CONTEXTS_PROTECTED: &str = "audio_contexts_protected";
    /// Font enumeration requests answered from the configured list.
    pub const FONT_ENUMERATIONS_SPOOFED: &str = "font_enumerations_spoofed";
    /// Geolocation reads answered with configured coordinates.
    pub const GEOLOCATION_REQUESTS_SPOOFED: &str = "geolocation_requests_spoofed";
    /// WebRTC connections with masked addresses.
    pub const WEBRTC_CONNECTIONS_PROTECTED: &str = "webrtc_connections_protected";
    /// Contexts whose usage matched a fingerprinting pattern.
    pub const SUSPICIOUS_PATTERNS_DETECTED: &str = "suspicious_patterns_detected";
    /// Protections skipped because the input was malformed.
    pub const PROTECTIONS_SKIPPED: &str = "protections_skipped";
}

/// Point-in-time copy of the named counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    counters: BTreeMap<String, u64>,
}

impl Statistics {
    /// Value of a counter; unknown names read as zero.
    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// All counters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of counters that have ever been incremented.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether nothing has been counted yet.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// Thread-safe named counters.
///
/// Purely observational: nothing in the engine reads these back to
/// make a protection decision. Counters are monotonic between resets.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    counters: Mutex<BTreeMap<String, u64>>,
}

impl StatsAggregator {
    /// Creates an aggregator with no counters set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to a counter, creating it at zero first if needed.
    pub fn increment(&self, name: &str) {
        self.add(name, 1);
    }

    /// Adds an amount to a counter.
    pub fn add(&self, name: &str, amount: u64) {
        let mut counters = self.counters.lock();
        match counters.get_mut(name) {
            Some(value) => *value = value.saturating_add(amount),
            None => {
                counters.insert(name.to_string(), amount);
            }
        }
    }

    /// Detached copy of all counters.
    pub fn snapshot(&self) -> Statistics {
        Statistics {
            counters: self.counters.lock().clone(),
        }
    }

    /// Clears every counter.
    pub fn reset(&self) {
        self.counters.lock().clear();
        info!("protection statistics reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_counter_reads_zero() {
        let stats = StatsAggregator::new();
        assert_eq!(stats.snapshot().get("never_touched"), 0);
    }

    #[test]
    fn test_increment_accumulates() {
        let stats = StatsAggregator::new();
        stats.increment(counter::CANVAS_OPERATIONS_SPOOFED);
        stats.increment(counter::CANVAS_OPERATIONS_SPOOFED);
        stats.add(counter::WEBGL_PARAMETERS_SPOOFED, 5);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.get(counter::CANVAS_OPERATIONS_SPOOFED), 2);
        assert_eq!(snapshot.get(counter::WEBGL_PARAMETERS_SPOOFED), 5);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let stats = StatsAggregator::new();
        stats.increment("ops");
        let snapshot = stats.snapshot();
        stats.increment("ops");

        assert_eq!(snapshot.get("ops"), 1);
        assert_eq!(stats.snapshot().get("ops"), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let stats = StatsAggregator::new();
        stats.increment("ops");
        stats.reset();

        assert!(stats.snapshot().is_empty());
    }

    #[test]
    fn test_concurrent_increments_all_counted() {
        use std::sync::Arc;

        let stats = Arc::new(StatsAggregator::new());
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let stats = Arc::clone(&stats);
                scope.spawn(move || {
                    for _ in 0..250 {
                        stats.increment("ops");
                    }
                });
            }
        });

        assert_eq!(stats.snapshot().get("ops"), 1000);
    }

    #[test]
    fn test_iter_in_name_order() {
        let stats = StatsAggregator::new();
        stats.increment("zeta");
        stats.increment("alpha");

        let snapshot = stats.snapshot();
        let ordered: Vec<&str> = snapshot.iter().map(|(name, _)| name).collect();
        assert_eq!(ordered, vec!["alpha", "zeta"]);
    }
}
