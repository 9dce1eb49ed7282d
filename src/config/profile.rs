//! The effective protection configuration and its validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use super::domains::{
    AntiDetectionConfig, AudioConfig, CanvasConfig, FontConfig, GeolocationConfig,
    NavigatorConfig, ScreenConfig, TimezoneConfig, WebGlConfig, WebRtcConfig,
};

/// Complete protection configuration for one context or the process
/// default.
///
/// Plain value semantics: resolution hands out owned copies, so a
/// caller can never observe a concurrent update mid-read. Invalid
/// values are representable but rejected at every store boundary via
/// [`FingerprintConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Master switch for the whole profile.
    pub enabled: bool,
    /// Human-readable profile identifier; must not be empty.
    pub profile_name: String,
    /// Creation timestamp (metadata, excluded from the content hash).
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp; see [`FingerprintConfig::touch`].
    pub updated_at: DateTime<Utc>,
    /// Canvas 2D settings.
    pub canvas: CanvasConfig,
    /// WebGL settings.
    pub webgl: WebGlConfig,
    /// Navigator object settings.
    pub navigator: NavigatorConfig,
    /// Audio fingerprint settings.
    pub audio: AudioConfig,
    /// Font enumeration settings.
    pub font: FontConfig,
    /// WebRTC leak settings.
    pub webrtc: WebRtcConfig,
    /// Geolocation settings.
    pub geolocation: GeolocationConfig,
    /// Screen geometry settings.
    pub screen: ScreenConfig,
    /// Timezone settings.
    pub timezone: TimezoneConfig,
    /// Automation concealment settings.
    pub anti_detection: AntiDetectionConfig,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            enabled: true,
            profile_name: "default".to_string(),
            created_at: now,
            updated_at: now,
            canvas: CanvasConfig::default(),
            webgl: WebGlConfig::default(),
            navigator: NavigatorConfig::default(),
            audio: AudioConfig::default(),
            font: FontConfig::default(),
            webrtc: WebRtcConfig::default(),
            geolocation: GeolocationConfig::default(),
            screen: ScreenConfig::default(),
            timezone: TimezoneConfig::default(),
            anti_detection: AntiDetectionConfig::default(),
        }
    }
}

impl FingerprintConfig {
    /// Checks every validation rule and returns all violations.
    ///
    /// Rules only apply to enabled domains: a disabled domain may
    /// carry arbitrary values without blocking an update.
    pub fn validation_errors(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.profile_name.is_empty() {
            errors.push(ConfigError::EmptyProfileName);
        }

        if self.navigator.enabled && self.navigator.user_agent.is_empty() {
            errors.push(ConfigError::EmptyUserAgent);
        }

        if self.screen.enabled && (self.screen.width == 0 || self.screen.height == 0) {
            errors.push(ConfigError::InvalidScreenDimensions {
                width: self.screen.width,
                height: self.screen.height,
            });
        }

        let noise_levels = [
            ("canvas", self.canvas.enabled, self.canvas.noise_level),
            ("webgl buffer", self.webgl.enabled, self.webgl.buffer_noise_level),
            ("audio", self.audio.enabled, self.audio.noise_level),
        ];
        for (domain, enabled, level) in noise_levels {
            // NaN fails the range check and is rejected with it.
            if enabled && !(0.0..=1.0).contains(&level) {
                errors.push(ConfigError::NoiseLevelOutOfRange { domain, level });
            }
        }

        if self.anti_detection.enabled
            && self.anti_detection.min_delay_ms > self.anti_detection.max_delay_ms
        {
            errors.push(ConfigError::InvalidDelayRange {
                min_ms: self.anti_detection.min_delay_ms,
                max_ms: self.anti_detection.max_delay_ms,
            });
        }

        errors
    }

    /// Returns the first validation violation, if any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.validation_errors().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Stamps the configuration as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// SHA-256 hex digest of the settings, for change detection.
    ///
    /// Equal settings hash equal: serialization order is fixed (struct
    /// fields in declaration order, parameter overrides sorted by key)
    /// and timestamps are metadata that do not participate, so touching
    /// a configuration without changing it keeps the hash stable.
    pub fn content_hash(&self) -> String {
        let mut canonical = self.clone();
        canonical.created_at = DateTime::<Utc>::MIN_UTC;
        canonical.updated_at = DateTime::<Utc>::MIN_UTC;

        let encoded = match toml::to_string(&canonical) {
            Ok(text) => text,
            Err(error) => {
                warn!("config serialization failed, hashing debug form: {error}");
                format!("{canonical:?}")
            }
        };
        let digest = Sha256::digest(encoded.as_bytes());

        digest.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}

/// A single configuration validation violation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("profile name cannot be empty")]
    EmptyProfileName,

    #[error("user agent cannot be empty when navigator spoofing is enabled")]
    EmptyUserAgent,

    #[error("screen dimensions {width}x{height} must be positive when screen spoofing is enabled")]
    InvalidScreenDimensions { width: u32, height: u32 },

    #[error("{domain} noise level {level} outside [0.0, 1.0]")]
    NoiseLevelOutOfRange { domain: &'static str, level: f64 },

    #[error("humanized delay range inverted: min {min_ms}ms exceeds max {max_ms}ms")]
    InvalidDelayRange { min_ms: u64, max_ms: u64 },

    #[error("failed to read config file: {0}")]
    FileReadError(String),

    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FingerprintConfig::default().validate().is_ok());
        assert!(FingerprintConfig::default().validation_errors().is_empty());
    }

    #[test]
    fn test_empty_profile_name_rejected() {
        let mut config = FingerprintConfig::default();
        config.profile_name.clear();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyProfileName)
        ));
    }

    #[test]
    fn test_out_of_range_noise_level_rejected() {
        let mut config = FingerprintConfig::default();
        config.canvas.noise_level = 1.5;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoiseLevelOutOfRange {
                domain: "canvas",
                ..
            })
        ));
    }

    #[test]
    fn test_nan_noise_level_rejected() {
        let mut config = FingerprintConfig::default();
        config.audio.noise_level = f64::NAN;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoiseLevelOutOfRange { domain: "audio", .. })
        ));
    }

    #[test]
    fn test_disabled_domain_skips_rule() {
        let mut config = FingerprintConfig::default();
        config.screen.enabled = false;
        config.screen.width = 0;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_all_errors_collected() {
        let mut config = FingerprintConfig::default();
        config.profile_name.clear();
        config.canvas.noise_level = 2.0;
        config.screen.height = 0;

        assert_eq!(config.validation_errors().len(), 3);
    }

    #[test]
    fn test_inverted_delay_range_rejected() {
        let mut config = FingerprintConfig::default();
        config.anti_detection.min_delay_ms = 500;
        config.anti_detection.max_delay_ms = 100;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDelayRange { .. })
        ));
    }

    #[test]
    fn test_content_hash_ignores_timestamps() {
        let mut config = FingerprintConfig::default();
        let before = config.content_hash();
        config.touch();

        assert_eq!(before, config.content_hash());
    }

    #[test]
    fn test_content_hash_tracks_settings() {
        let config = FingerprintConfig::default();
        let mut changed = config.clone();
        changed.canvas.noise_level = 0.2;

        assert_ne!(config.content_hash(), changed.content_hash());
    }

    #[test]
    fn test_content_hash_equal_for_equal_parameter_maps() {
        let build = || {
            let mut config = FingerprintConfig::default();
            for (name, value) in [
                ("MAX_TEXTURE_SIZE", "8192"),
                ("MAX_CUBE_MAP_TEXTURE_SIZE", "8192"),
                ("MAX_RENDERBUFFER_SIZE", "8192"),
                ("MAX_VERTEX_ATTRIBS", "16"),
                ("MAX_VARYING_VECTORS", "15"),
                ("MAX_VERTEX_UNIFORM_VECTORS", "4096"),
                ("MAX_FRAGMENT_UNIFORM_VECTORS", "1024"),
                ("MAX_COMBINED_TEXTURE_IMAGE_UNITS", "32"),
            ] {
                config
                    .webgl
                    .parameters
                    .insert(name.to_string(), value.to_string());
            }
            config
        };

        // Every independently built copy must serialize identically.
        let reference = build().content_hash();
        for _ in 0..16 {
            assert_eq!(build().content_hash(), reference);
        }

        let mut changed = build();
        changed
            .webgl
            .parameters
            .insert("MAX_TEXTURE_SIZE".to_string(), "4096".to_string());
        assert_ne!(changed.content_hash(), reference);
    }

    #[test]
    fn test_partial_toml_overlays_defaults() {
        let config: FingerprintConfig = toml::from_str(
            r#"
            profile_name = "workstation"

            [canvas]
            noise_level = 0.05
            "#,
        )
        .unwrap();

        assert_eq!(config.profile_name, "workstation");
        assert!((config.canvas.noise_level - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.screen.width, 1920);
        assert!(config.validate().is_ok());
    }
}
