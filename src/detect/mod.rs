//! Fingerprinting probe detection.
//!
//! This module tracks how each context uses the protected surfaces
//! and classifies access patterns that look like fingerprinting
//! scripts. The verdicts are heuristic and advisory; they never block
//! an operation.

mod detector;
mod policy;
mod usage;

pub use detector::UsagePatternDetector;
pub use policy::{DetectionPolicy, SuspicionReason, SENSITIVE_PARAMETERS};
pub use usage::{OpCategory, UsageStats, HISTORY_CAPACITY};
