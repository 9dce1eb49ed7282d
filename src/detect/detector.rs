//! Per-context pattern detection.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::context::ContextId;

use super::policy::{DetectionPolicy, SuspicionReason};
use super::usage::UsageStats;

/// Tracks operation streams per context and classifies them.
///
/// Recording and classification hold the lock only for the map access;
/// the caller's rendering work never waits on another context's
/// assessment. Asking about a context that has recorded nothing is
/// benign and answers `false`.
#[derive(Debug)]
pub struct UsagePatternDetector {
    policy: DetectionPolicy,
    stats: Mutex<HashMap<ContextId, UsageStats>>,
}

impl UsagePatternDetector {
    /// Creates a detector with the default policy.
    pub fn new() -> Self {
        Self::with_policy(DetectionPolicy::default())
    }

    /// Creates a detector with custom thresholds.
    pub fn with_policy(policy: DetectionPolicy) -> Self {
        Self {
            policy,
            stats: Mutex::new(HashMap::new()),
        }
    }

    /// The thresholds this detector applies.
    pub fn policy(&self) -> &DetectionPolicy {
        &self.policy
    }

    /// Records an operation without parameter detail.
    pub fn record(&self, ctx: ContextId, operation: &str) {
        self.record_with_param(ctx, operation, None);
    }

    /// Records an operation, creating the context entry on first use.
    pub fn record_with_param(&self, ctx: ContextId, operation: &str, parameter: Option<&str>) {
        let mut stats = self.stats.lock();
        stats.entry(ctx).or_default().record(operation, parameter);
        trace!(context = %ctx, operation, "operation recorded");
    }

    /// Whether the context's usage matches a fingerprinting pattern.
    pub fn is_likely_fingerprinting(&self, ctx: ContextId) -> bool {
        self.suspicion(ctx).is_some()
    }

    /// The first matching rule for a context, if any.
    ///
    /// Logs once per context when it first turns suspicious, so a page
    /// polling the verdict does not flood the log.
    pub fn suspicion(&self, ctx: ContextId) -> Option<SuspicionReason> {
        let mut stats = self.stats.lock();
        let entry = stats.get_mut(&ctx)?;
        match self.policy.assess(entry) {
            Ok(()) => None,
            Err(reason) => {
                if !entry.was_flagged() {
                    entry.mark_flagged();
                    warn!(context = %ctx, %reason, "fingerprinting pattern detected");
                }
                Some(reason)
            }
        }
    }

    /// Snapshot of a context's usage record.
    pub fn usage(&self, ctx: ContextId) -> Option<UsageStats> {
        self.stats.lock().get(&ctx).cloned()
    }

    /// Drops all state for a destroyed context. Idempotent.
    pub fn remove_context(&self, ctx: ContextId) {
        if self.stats.lock().remove(&ctx).is_some() {
            trace!(context = %ctx, "usage record removed");
        }
    }

    /// Number of contexts currently tracked.
    pub fn context_count(&self) -> usize {
        self.stats.lock().len()
    }
}

impl Default for UsagePatternDetector {
    fn default() -> Self {
        Self::new()
    }
}
