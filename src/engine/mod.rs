//! The protection engine.
//!
//! One [`FingerprintEngine`] owns every shared component: the config
//! resolver, the usage detector, the statistics aggregator, and the
//! seed deriver. Rendering-engine bindings construct it once at
//! process start, pass it by reference, and call its operations inline
//! from whichever thread owns the calling context. There are no
//! process-wide singletons.
//!
//! Every entry point checks the enable switch first and returns
//! without locking when protection is off. Failure never propagates
//! into the caller's rendering path: malformed input degrades to a
//! skipped protection, reported through statistics and logging.

mod canvas;
mod webgl;

pub use webgl::{PrecisionFormat, WebGlParameterValue, BLOCKED_EXTENSIONS, DEFAULT_EXTENSIONS};

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};
use tracing::{debug, info};

use crate::config::{
    ConfigError, ConfigResolver, FileConfig, FingerprintConfig, GeolocationConfig,
    NavigatorConfig, ScreenConfig, TimezoneConfig, WebRtcConfig,
};
use crate::context::{ContextId, ContextMinter};
use crate::detect::{SuspicionReason, UsagePatternDetector};
use crate::inject::{inject_audio_noise, inject_scalar_noise, PixelNoiseInjector};
use crate::metrics::{counter, MetricsSnapshot, Statistics, StatsAggregator};
use crate::noise::SeedDeriver;

/// The fingerprint spoofing and probe-detection engine.
pub struct FingerprintEngine {
    enabled: AtomicBool,
    resolver: ConfigResolver,
    detector: UsagePatternDetector,
    stats: StatsAggregator,
    seeds: SeedDeriver,
    minter: ContextMinter,
    injector: PixelNoiseInjector,
    delay_rng: Mutex<ChaCha20Rng>,
}

impl FingerprintEngine {
    /// Creates an engine with default configuration and a fresh
    /// session salt.
    pub fn new() -> Self {
        Self::with_config(FileConfig::default())
    }

    /// Creates an engine from a loaded configuration file, with a
    /// fresh session salt.
    pub fn with_config(config: FileConfig) -> Self {
        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        Self::with_session_salt(config, salt)
    }

    /// Creates an engine with an explicit session salt.
    ///
    /// All spoofed noise is a function of the salt, so persisting it
    /// alongside a profile keeps the presented fingerprint stable
    /// across browser runs instead of per-run.
    pub fn with_session_salt(config: FileConfig, salt: [u8; 16]) -> Self {
        let enabled = config.fingerprint.enabled;

        info!(
            profile = %config.fingerprint.profile_name,
            enabled,
            "fingerprint engine starting"
        );

        Self {
            enabled: AtomicBool::new(enabled),
            resolver: ConfigResolver::with_fallback(config.fingerprint),
            detector: UsagePatternDetector::with_policy(config.detection),
            stats: StatsAggregator::new(),
            seeds: SeedDeriver::new(salt),
            minter: ContextMinter::new(),
            injector: PixelNoiseInjector::new(),
            delay_rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }

    /// Whether protection is currently on.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Flips the process-wide switch. When off, every entry point is
    /// an immediate passthrough.
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::Relaxed);
        if previous != enabled {
            info!(enabled, "protection toggled");
        }
    }

    /// Mints a fresh context identity.
    ///
    /// Identities are never reused within a process, so stale state
    /// from a destroyed context can never bleed into a new one.
    pub fn mint_context(&self) -> ContextId {
        self.minter.mint()
    }

    /// Effective configuration for a context; `None` resolves the
    /// process default.
    pub fn config_for(&self, ctx: Option<ContextId>) -> FingerprintConfig {
        match ctx {
            Some(ctx) => self.resolver.resolve(ctx),
            None => self.resolver.default_config(),
        }
    }

    /// Installs a validated per-context override.
    pub fn set_config_for(
        &self,
        ctx: ContextId,
        config: FingerprintConfig,
    ) -> Result<(), ConfigError> {
        self.resolver.set_for_context(ctx, config)
    }

    /// Replaces the validated process default.
    pub fn set_default_config(&self, config: FingerprintConfig) -> Result<(), ConfigError> {
        self.resolver.set_default(config)
    }

    /// Drops all state for a destroyed context.
    ///
    /// The lifecycle collaborator must call this on teardown or usage
    /// and override entries survive for the process lifetime.
    pub fn context_destroyed(&self, ctx: ContextId) {
        self.resolver.remove_for_context(ctx);
        self.detector.remove_context(ctx);
        debug!(context = %ctx, "context destroyed");
    }

    /// Records an operation for pattern detection.
    pub fn record_operation(&self, ctx: ContextId, operation: &str) {
        if !self.is_enabled() {
            return;
        }
        self.detector.record(ctx, operation);
    }

    /// Records a getParameter call with the queried parameter name.
    pub fn record_parameter_query(&self, ctx: ContextId, parameter: &str) {
        if !self.is_enabled() {
            return;
        }
        self.detector
            .record_with_param(ctx, "getParameter", Some(parameter));
    }

    /// Whether a context's usage matches a fingerprinting pattern.
    pub fn is_likely_fingerprinting(&self, ctx: ContextId) -> bool {
        self.assess_context(ctx).is_some()
    }

    /// The matched detection rule for a context, if any.
    pub fn assess_context(&self, ctx: ContextId) -> Option<SuspicionReason> {
        if !self.is_enabled() {
            return None;
        }
        let already_flagged = self
            .detector
            .usage(ctx)
            .is_some_and(|usage| usage.was_flagged());
        let reason = self.detector.suspicion(ctx)?;
        if !already_flagged {
            self.stats.increment(counter::SUSPICIOUS_PATTERNS_DETECTED);
        }
        Some(reason)
    }

    /// Notes that a frame received the protection script.
    pub fn note_frame_protected(&self) {
        if self.is_enabled() {
            self.stats.increment(counter::FRAMES_PROTECTED);
        }
    }

    /// Navigator values to report, or `None` for passthrough.
    pub fn navigator_overrides(&self, ctx: Option<ContextId>) -> Option<NavigatorConfig> {
        if !self.is_enabled() {
            return None;
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.navigator.enabled {
            return None;
        }
        self.stats.increment(counter::NAVIGATOR_PROPERTIES_SPOOFED);
        Some(config.navigator)
    }

    /// Screen geometry to report, or `None` for passthrough.
    pub fn screen_overrides(&self, ctx: Option<ContextId>) -> Option<ScreenConfig> {
        if !self.is_enabled() {
            return None;
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.screen.enabled {
            return None;
        }
        self.stats.increment(counter::NAVIGATOR_PROPERTIES_SPOOFED);
        Some(config.screen)
    }

    /// Position to report for geolocation reads.
    pub fn geolocation_override(&self, ctx: Option<ContextId>) -> Option<GeolocationConfig> {
        if !self.is_enabled() {
            return None;
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.geolocation.enabled {
            return None;
        }
        self.stats.increment(counter::GEOLOCATION_REQUESTS_SPOOFED);
        Some(config.geolocation)
    }

    /// Timezone to report, or `None` for passthrough.
    pub fn timezone_override(&self, ctx: Option<ContextId>) -> Option<TimezoneConfig> {
        if !self.is_enabled() {
            return None;
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.timezone.enabled {
            return None;
        }
        Some(config.timezone)
    }

    /// Font list to report for enumeration, replacing the system list.
    pub fn font_allowlist(&self, ctx: Option<ContextId>) -> Option<Vec<String>> {
        if !self.is_enabled() {
            return None;
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.font.enabled {
            return None;
        }
        self.stats.increment(counter::FONT_ENUMERATIONS_SPOOFED);
        Some(config.font.available_fonts)
    }

    /// Address masking rules for WebRTC, or `None` for passthrough.
    pub fn webrtc_policy(&self, ctx: Option<ContextId>) -> Option<WebRtcConfig> {
        if !self.is_enabled() {
            return None;
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.webrtc.enabled {
            return None;
        }
        self.stats.increment(counter::WEBRTC_CONNECTIONS_PROTECTED);
        Some(config.webrtc)
    }

    /// Whether a window/document property probe should see nothing.
    pub fn should_block_property(&self, ctx: Option<ContextId>, property: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.anti_detection.enabled {
            return false;
        }
        let blocked = config
            .anti_detection
            .blocked_properties
            .iter()
            .any(|name| name == property);
        if blocked {
            self.stats.increment(counter::WEBDRIVER_DETECTIONS_BLOCKED);
            debug!(property, "automation marker probe blocked");
        }
        blocked
    }

    /// Whether a script source matches a known probing pattern.
    pub fn should_block_script(&self, ctx: Option<ContextId>, source: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.anti_detection.enabled {
            return false;
        }
        let blocked = config
            .anti_detection
            .blocked_script_patterns
            .iter()
            .any(|pattern| source.contains(pattern.as_str()));
        if blocked {
            self.stats.increment(counter::WEBDRIVER_DETECTIONS_BLOCKED);
        }
        blocked
    }

    /// A human-plausible delay to insert before an automation-driven
    /// request, or `None` when timing jitter is off.
    ///
    /// The jitter is drawn from a CSPRNG on purpose: delays are timing
    /// side channels, and a guessable stream would let a page separate
    /// jitter from genuine latency.
    pub fn humanized_delay(&self, ctx: Option<ContextId>) -> Option<Duration> {
        if !self.is_enabled() {
            return None;
        }
        let config = self.config_for(ctx);
        let anti = &config.anti_detection;
        if !config.enabled || !anti.enabled || !anti.randomize_request_timing {
            return None;
        }
        let min = anti.min_delay_ms;
        let max = anti.max_delay_ms.max(min);
        let spread = (max - min).saturating_add(1);
        let jitter = self.delay_rng.lock().next_u64() % spread;
        Some(Duration::from_millis(min + jitter))
    }

    /// Perturbs audio samples in place. Returns whether noise was
    /// applied.
    pub fn protect_audio_buffer(&self, ctx: Option<ContextId>, samples: &mut [f32]) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if samples.is_empty() {
            self.note_skipped("empty audio buffer");
            return false;
        }
        let config = self.config_for(ctx);
        if !config.enabled || !config.audio.enabled || !config.audio.add_noise {
            return false;
        }
        if let Some(ctx) = ctx {
            self.detector.record(ctx, "getChannelData");
        }
        let seed = self.seeds.derive(ctx);
        let touched = inject_audio_noise(samples, config.audio.noise_level, seed);
        if touched > 0 {
            self.stats.increment(counter::AUDIO_CONTEXTS_PROTECTED);
        }
        touched > 0
    }

    /// Perturbs a numeric parameter deterministically for a context.
    ///
    /// The operation name separates noise streams, so two different
    /// parameters spoofed for the same context do not share jitter.
    pub fn spoof_scalar(
        &self,
        ctx: Option<ContextId>,
        operation: &str,
        value: f64,
        noise_level: f64,
    ) -> f64 {
        if !self.is_enabled() || noise_level <= 0.0 {
            return value;
        }
        let seed = self.seeds.derive_with(ctx, operation.as_bytes());
        inject_scalar_noise(value, noise_level, seed)
    }

    /// Current protection counters.
    pub fn statistics(&self) -> Statistics {
        self.stats.snapshot()
    }

    /// Clears the protection counters.
    pub fn reset_statistics(&self) {
        self.stats.reset();
    }

    /// Snapshot of engine state for the metrics exporter.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            enabled: self.is_enabled(),
            contexts_tracked: self.detector.context_count(),
            config_overrides: self.resolver.override_count(),
            counters: self.stats.snapshot(),
        }
    }

    /// Counts a protection skipped over malformed input.
    fn note_skipped(&self, reason: &'static str) {
        self.stats.increment(counter::PROTECTIONS_SKIPPED);
        debug!(reason, "protection skipped");
    }

    /// Logs a final summary. The engine holds no external resources,
    /// so this is observability, not cleanup.
    pub fn shutdown(&self) {
        let stats = self.stats.snapshot();
        info!(
            contexts = self.detector.context_count(),
            overrides = self.resolver.override_count(),
            counters = stats.len(),
            "fingerprint engine shutting down"
        );
    }
}

impl Default for FingerprintEngine {
    fn default() -> Self {
        Self::new()
    }
}
