//! Tunable thresholds for pattern classification.
//!
//! The defaults match observed fingerprinting scripts, but every
//! threshold is configuration, not invariant. All rules are
//! independent and OR-combined.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::usage::UsageStats;

/// Parameters whose values identify the GPU and driver. Sweeping
/// these is the classic WebGL fingerprint probe.
pub const SENSITIVE_PARAMETERS: &[&str] = &[
    "VENDOR",
    "RENDERER",
    "VERSION",
    "SHADING_LANGUAGE_VERSION",
    "UNMASKED_VENDOR_WEBGL",
    "UNMASKED_RENDERER_WEBGL",
];

/// Thresholds for fingerprinting classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionPolicy {
    /// Reads per draw above which canvas usage is suspicious.
    pub read_draw_ratio: f64,
    /// Distinct sensitive parameters that constitute a sweep.
    pub min_sensitive_params: usize,
    /// Longest tolerated query run without a render call.
    pub max_consecutive_queries: u32,
    /// Queries per render call above which usage is suspicious.
    pub max_queries_per_render: f64,
    /// Tolerated total queries when nothing is ever rendered.
    pub max_blind_queries: u64,
    /// Operation count above which timing is examined.
    pub burst_ops: u64,
    /// Window below which `burst_ops` operations count as a burst.
    pub burst_window_ms: u64,
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            read_draw_ratio: 2.0,       // twice as many reads as draws
            min_sensitive_params: 3,    // vendor + renderer + version
            max_consecutive_queries: 5, // legitimate setup stays below this
            max_queries_per_render: 10.0,
            max_blind_queries: 5,
            burst_ops: 10,
            burst_window_ms: 1000, // scripted probes finish within a second
        }
    }
}

impl DetectionPolicy {
    /// Creates thresholds that flag earlier.
    pub fn strict() -> Self {
        Self {
            read_draw_ratio: 1.0,
            min_sensitive_params: 2,
            max_consecutive_queries: 3,
            max_queries_per_render: 5.0,
            max_blind_queries: 3,
            burst_ops: 5,
            burst_window_ms: 2000,
        }
    }

    /// Creates thresholds that tolerate query-heavy applications.
    pub fn lenient() -> Self {
        Self {
            read_draw_ratio: 5.0,
            min_sensitive_params: 5,
            max_consecutive_queries: 20,
            max_queries_per_render: 50.0,
            max_blind_queries: 30,
            burst_ops: 50,
            burst_window_ms: 250,
        }
    }

    /// Checks a usage record against the thresholds.
    ///
    /// Returns the first rule that matches, in a fixed evaluation
    /// order, so callers get a stable explanation for a given record.
    pub fn assess(&self, stats: &UsageStats) -> Result<(), SuspicionReason> {
        if stats.reads > 0 {
            let read_heavy = if stats.draws == 0 {
                true
            } else {
                stats.reads as f64 / stats.draws as f64 > self.read_draw_ratio
            };
            if read_heavy {
                return Err(SuspicionReason::ReadHeavyUsage {
                    reads: stats.reads,
                    draws: stats.draws,
                    threshold: self.read_draw_ratio,
                });
            }
        }

        let sensitive = SENSITIVE_PARAMETERS
            .iter()
            .filter(|name| stats.queried_parameters().contains(**name))
            .count();
        if sensitive >= self.min_sensitive_params {
            return Err(SuspicionReason::SensitiveParameterSweep {
                observed: sensitive,
                threshold: self.min_sensitive_params,
            });
        }

        if stats.longest_query_run() > self.max_consecutive_queries {
            return Err(SuspicionReason::ConsecutiveQueryRun {
                observed: stats.longest_query_run(),
                threshold: self.max_consecutive_queries,
            });
        }

        let queries = stats.queries();
        if stats.render_ops > 0 {
            if queries as f64 / stats.render_ops as f64 > self.max_queries_per_render {
                return Err(SuspicionReason::QueryFlood {
                    queries,
                    renders: stats.render_ops,
                });
            }
        } else if queries > self.max_blind_queries {
            return Err(SuspicionReason::QueryFlood { queries, renders: 0 });
        }

        if stats.total_ops > self.burst_ops {
            if let Some(span) = stats.span() {
                if span < Duration::from_millis(self.burst_window_ms) {
                    return Err(SuspicionReason::OperationBurst {
                        operations: stats.total_ops,
                        window_ms: self.burst_window_ms,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Classification outcomes, one per matched rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SuspicionReason {
    #[error("read-heavy canvas usage: {reads} reads against {draws} draws (ratio threshold {threshold})")]
    ReadHeavyUsage { reads: u64, draws: u64, threshold: f64 },

    #[error("sensitive parameter sweep: {observed} identity parameters queried (threshold {threshold})")]
    SensitiveParameterSweep { observed: usize, threshold: usize },

    #[error("unbroken query run of {observed} without a render call (threshold {threshold})")]
    ConsecutiveQueryRun { observed: u32, threshold: u32 },

    #[error("query flood: {queries} queries against {renders} render calls")]
    QueryFlood { queries: u64, renders: u64 },

    #[error("operation burst: {operations} operations inside {window_ms}ms")]
    OperationBurst { operations: u64, window_ms: u64 },
}
