//! Prometheus metrics registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

use super::aggregator::{counter, Statistics};

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of engine state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether protection is currently enabled.
    pub enabled: bool,
    /// Contexts with a usage record in the detector.
    pub contexts_tracked: usize,
    /// Contexts with a configuration override installed.
    pub config_overrides: usize,
    /// Current protection counters.
    pub counters: Statistics,
}

/// Prometheus registry for protection monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Engine state
    enabled_status: IntGauge,
    contexts_tracked: IntGauge,
    config_overrides: IntGauge,

    // Protection counters
    frames_protected: IntCounter,
    canvas_operations_spoofed: IntCounter,
    webgl_parameters_spoofed: IntCounter,
    navigator_properties_spoofed: IntCounter,
    webdriver_detections_blocked: IntCounter,
    audio_contexts_protected: IntCounter,
    font_enumerations_spoofed: IntCounter,
    geolocation_requests_spoofed: IntCounter,
    webrtc_connections_protected: IntCounter,
    suspicious_patterns_detected: IntCounter,
    protections_skipped: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new registry with all protection metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        // Engine state
        let enabled_status = IntGauge::new(
            "fingerprint_shield_enabled",
            "Whether protection is enabled (1=on, 0=off)",
        )?;
        let contexts_tracked = IntGauge::new(
            "fingerprint_shield_contexts_tracked",
            "Contexts with a usage record in the detector",
        )?;
        let config_overrides = IntGauge::new(
            "fingerprint_shield_config_overrides",
            "Contexts with a configuration override installed",
        )?;

        // Protection counters
        let frames_protected = IntCounter::new(
            "fingerprint_shield_frames_protected_total",
            "Frames that received any protection",
        )?;
        let canvas_operations_spoofed = IntCounter::new(
            "fingerprint_shield_canvas_operations_spoofed_total",
            "Canvas pixel buffers and exports perturbed",
        )?;
        let webgl_parameters_spoofed = IntCounter::new(
            "fingerprint_shield_webgl_parameters_spoofed_total",
            "WebGL parameter values substituted",
        )?;
        let navigator_properties_spoofed = IntCounter::new(
            "fingerprint_shield_navigator_properties_spoofed_total",
            "Navigator property reads answered with spoofed values",
        )?;
        let webdriver_detections_blocked = IntCounter::new(
            "fingerprint_shield_webdriver_detections_blocked_total",
            "Automation marker probes hidden",
        )?;
        let audio_contexts_protected = IntCounter::new(
            "fingerprint_shield_audio_contexts_protected_total",
            "Audio buffers perturbed",
        )?;
        let font_enumerations_spoofed = IntCounter::new(
            "fingerprint_shield_font_enumerations_spoofed_total",
            "Font enumeration requests answered from the configured list",
        )?;
        let geolocation_requests_spoofed = IntCounter::new(
            "fingerprint_shield_geolocation_requests_spoofed_total",
            "Geolocation reads answered with configured coordinates",
        )?;
        let webrtc_connections_protected = IntCounter::new(
            "fingerprint_shield_webrtc_connections_protected_total",
            "WebRTC connections with masked addresses",
        )?;
        let suspicious_patterns_detected = IntCounter::new(
            "fingerprint_shield_suspicious_patterns_detected_total",
            "Contexts whose usage matched a fingerprinting pattern",
        )?;
        let protections_skipped = IntCounter::new(
            "fingerprint_shield_protections_skipped_total",
            "Protections skipped because the input was malformed",
        )?;

        // Register all metrics
        registry.register(Box::new(enabled_status.clone()))?;
        registry.register(Box::new(contexts_tracked.clone()))?;
        registry.register(Box::new(config_overrides.clone()))?;
        registry.register(Box::new(frames_protected.clone()))?;
        registry.register(Box::new(canvas_operations_spoofed.clone()))?;
        registry.register(Box::new(webgl_parameters_spoofed.clone()))?;
        registry.register(Box::new(navigator_properties_spoofed.clone()))?;
        registry.register(Box::new(webdriver_detections_blocked.clone()))?;
        registry.register(Box::new(audio_contexts_protected.clone()))?;
        registry.register(Box::new(font_enumerations_spoofed.clone()))?;
        registry.register(Box::new(geolocation_requests_spoofed.clone()))?;
        registry.register(Box::new(webrtc_connections_protected.clone()))?;
        registry.register(Box::new(suspicious_patterns_detected.clone()))?;
        registry.register(Box::new(protections_skipped.clone()))?;

        Ok(Self {
            registry,
            enabled_status,
            contexts_tracked,
            config_overrides,
            frames_protected,
            canvas_operations_spoofed,
            webgl_parameters_spoofed,
            navigator_properties_spoofed,
            webdriver_detections_blocked,
            audio_contexts_protected,
            font_enumerations_spoofed,
            geolocation_requests_spoofed,
            webrtc_connections_protected,
            suspicious_patterns_detected,
            protections_skipped,
        })
    }

    /// Updates all metrics from a snapshot of engine state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.enabled_status.set(i64::from(snapshot.enabled));
        self.contexts_tracked.set(snapshot.contexts_tracked as i64);
        self.config_overrides.set(snapshot.config_overrides as i64);

        // Counters advance by the difference, so repeated updates from
        // the same snapshot are harmless.
        let pairs = [
            (&self.frames_protected, counter::FRAMES_PROTECTED),
            (
                &self.canvas_operations_spoofed,
                counter::CANVAS_OPERATIONS_SPOOFED,
            ),
            (
                &self.webgl_parameters_spoofed,
                counter::WEBGL_PARAMETERS_SPOOFED,
            ),
            (
                &self.navigator_properties_spoofed,
                counter::NAVIGATOR_PROPERTIES_SPOOFED,
            ),
            (
                &self.webdriver_detections_blocked,
                counter::WEBDRIVER_DETECTIONS_BLOCKED,
            ),
            (
                &self.audio_contexts_protected,
                counter::AUDIO_CONTEXTS_PROTECTED,
            ),
            (
                &self.font_enumerations_spoofed,
                counter::FONT_ENUMERATIONS_SPOOFED,
            ),
            (
                &self.geolocation_requests_spoofed,
                counter::GEOLOCATION_REQUESTS_SPOOFED,
            ),
            (
                &self.webrtc_connections_protected,
                counter::WEBRTC_CONNECTIONS_PROTECTED,
            ),
            (
                &self.suspicious_patterns_detected,
                counter::SUSPICIOUS_PATTERNS_DETECTED,
            ),
            (&self.protections_skipped, counter::PROTECTIONS_SKIPPED),
        ];

        for (metric, name) in pairs {
            let target = snapshot.counters.get(name);
            let current = metric.get();
            if target > current {
                metric.inc_by(target - current);
            }
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
