//! Protection statistics and Prometheus export.
//!
//! This module provides observability into the protection engine:
//! process-wide named counters that the engine increments inline, and
//! an optional Prometheus exporter with an HTTP endpoint.
//!
//! # Metrics Exposed
//!
//! ## Engine State
//! - `fingerprint_shield_enabled` - Whether protection is enabled (1=on, 0=off)
//! - `fingerprint_shield_contexts_tracked` - Contexts with a usage record
//! - `fingerprint_shield_config_overrides` - Contexts with a config override
//!
//! ## Protection Counters
//! - `fingerprint_shield_frames_protected_total` - Frames that received protection
//! - `fingerprint_shield_canvas_operations_spoofed_total` - Canvas buffers perturbed
//! - `fingerprint_shield_webgl_parameters_spoofed_total` - WebGL parameters substituted
//! - `fingerprint_shield_navigator_properties_spoofed_total` - Navigator reads spoofed
//! - `fingerprint_shield_webdriver_detections_blocked_total` - Automation probes hidden
//! - `fingerprint_shield_audio_contexts_protected_total` - Audio buffers perturbed
//! - `fingerprint_shield_font_enumerations_spoofed_total` - Font lists substituted
//! - `fingerprint_shield_geolocation_requests_spoofed_total` - Positions substituted
//! - `fingerprint_shield_webrtc_connections_protected_total` - Addresses masked
//! - `fingerprint_shield_suspicious_patterns_detected_total` - Probe patterns flagged
//! - `fingerprint_shield_protections_skipped_total` - Malformed inputs skipped
//!
//! # Example
//!
//! ```
//! use fingerprint_shield::metrics::{counter, StatsAggregator};
//!
//! let stats = StatsAggregator::new();
//! stats.increment(counter::CANVAS_OPERATIONS_SPOOFED);
//!
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.get(counter::CANVAS_OPERATIONS_SPOOFED), 1);
//! ```

mod aggregator;
mod exporter;
#[cfg(feature = "metrics")]
mod server;

pub use aggregator::{counter, StatsAggregator, Statistics};
pub use exporter::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig};
