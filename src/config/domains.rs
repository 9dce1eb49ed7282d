//! Per-domain protection settings.
//!
//! One struct per observable surface. Defaults describe a plausible
//! mid-range Windows desktop running Chrome; values that pages
//! cross-check against each other (renderer strings, screen geometry,
//! timezone offset) are chosen to stay mutually consistent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canvas 2D protection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Enables canvas protection as a whole.
    pub enabled: bool,
    /// Whether pixel readbacks get noise at all.
    pub add_noise: bool,
    /// Noise strength in [0, 1].
    pub noise_level: f64,
    /// Gate for `getImageData` interception.
    pub protect_image_data: bool,
    /// Gate for `toDataURL` / `toBlob` interception.
    pub protect_data_url: bool,
    /// Gate for `measureText` metric offsets.
    pub spoof_text_metrics: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            add_noise: true,
            noise_level: 0.1,
            protect_image_data: true,
            protect_data_url: true,
            spoof_text_metrics: true,
        }
    }
}

/// WebGL protection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebGlConfig {
    /// Enables WebGL protection as a whole.
    pub enabled: bool,
    /// Reported GL vendor string.
    pub vendor: String,
    /// Reported GL renderer string.
    pub renderer: String,
    /// Reported GL version string.
    pub version: String,
    /// Reported GLSL version string.
    pub shading_language_version: String,
    /// Whether readbacks and texture uploads get byte noise.
    pub add_noise_to_buffers: bool,
    /// Buffer noise strength in [0, 1].
    pub buffer_noise_level: f64,
    /// Extensions appended to the spoofed extension list.
    pub extensions: Vec<String>,
    /// Per-parameter overrides, keyed by parameter name. Values that
    /// parse as integers are reported numerically. Kept sorted so the
    /// serialized form, and the content hash over it, is stable.
    pub parameters: BTreeMap<String, String>,
}

impl Default for WebGlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vendor: "Google Inc. (Intel)".to_string(),
            renderer: "ANGLE (Intel, Intel(R) UHD Graphics 620 Direct3D11 vs_5_0 ps_5_0, D3D11)"
                .to_string(),
            version: "OpenGL ES 2.0 (ANGLE 2.1.0.0)".to_string(),
            shading_language_version: "OpenGL ES GLSL ES 1.00 (ANGLE 2.1.0.0)".to_string(),
            add_noise_to_buffers: true,
            buffer_noise_level: 0.01,
            extensions: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }
}

/// Navigator object settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Enables navigator spoofing as a whole.
    pub enabled: bool,
    /// Reported user agent string.
    pub user_agent: String,
    /// Reported `navigator.platform` value.
    pub platform: String,
    /// Reported language preference list, most preferred first.
    pub languages: Vec<String>,
    /// Reported logical core count.
    pub hardware_concurrency: u32,
    /// Reported device memory in GiB.
    pub device_memory: u64,
    /// Report `navigator.webdriver` as absent.
    pub hide_webdriver: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            platform: "Win32".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
            hardware_concurrency: 8,
            device_memory: 8,
            hide_webdriver: true,
        }
    }
}

/// Audio fingerprint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Enables audio protection as a whole.
    pub enabled: bool,
    /// Whether audio samples get noise at all.
    pub add_noise: bool,
    /// Sample noise strength in [0, 1]; audible above ~0.01.
    pub noise_level: f64,
    /// Gate for analyser node readouts.
    pub protect_analyser: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            add_noise: true,
            noise_level: 0.001,
            protect_analyser: true,
        }
    }
}

/// Font enumeration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Enables font list spoofing.
    pub enabled: bool,
    /// Fonts reported as installed, replacing the real system list.
    pub available_fonts: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            available_fonts: [
                "Arial",
                "Arial Black",
                "Calibri",
                "Cambria",
                "Comic Sans MS",
                "Consolas",
                "Courier New",
                "Georgia",
                "Impact",
                "Lucida Console",
                "Lucida Sans Unicode",
                "Microsoft Sans Serif",
                "Palatino Linotype",
                "Segoe UI",
                "Tahoma",
                "Times New Roman",
                "Trebuchet MS",
                "Verdana",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// WebRTC leak settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebRtcConfig {
    /// Enables WebRTC address masking.
    pub enabled: bool,
    /// Replace host candidates with the fake address.
    pub mask_local_ips: bool,
    /// Documentation-range address reported as the public IP.
    pub fake_public_ip: String,
}

impl Default for WebRtcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mask_local_ips: true,
            fake_public_ip: "203.0.113.1".to_string(),
        }
    }
}

/// Geolocation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Enables position spoofing.
    pub enabled: bool,
    /// Reported latitude in degrees.
    pub latitude: f64,
    /// Reported longitude in degrees.
    pub longitude: f64,
    /// Reported accuracy radius in meters.
    pub accuracy: f64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latitude: 40.7128, // New York
            longitude: -74.0060,
            accuracy: 10.0,
        }
    }
}

/// Screen geometry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Enables screen geometry spoofing.
    pub enabled: bool,
    /// Reported screen width in pixels.
    pub width: u32,
    /// Reported screen height in pixels.
    pub height: u32,
    /// Reported color depth in bits.
    pub color_depth: u32,
    /// Reported device pixel ratio.
    pub device_pixel_ratio: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 1920,
            height: 1080,
            color_depth: 24,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Timezone settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimezoneConfig {
    /// Enables timezone spoofing.
    pub enabled: bool,
    /// IANA timezone identifier.
    pub timezone: String,
    /// Offset from UTC in minutes, matching `timezone`.
    pub offset_minutes: i32,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timezone: "America/New_York".to_string(),
            offset_minutes: -300,
        }
    }
}

/// Automation / webdriver concealment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiDetectionConfig {
    /// Enables automation concealment as a whole.
    pub enabled: bool,
    /// Remove the `navigator.webdriver` property entirely.
    pub hide_webdriver_property: bool,
    /// Present a plausible `chrome.runtime` object.
    pub spoof_chrome_runtime: bool,
    /// Window/document properties reported as absent.
    pub blocked_properties: Vec<String>,
    /// Substrings that mark a probing script for the blocker.
    pub blocked_script_patterns: Vec<String>,
    /// Jitter outgoing automation-driven requests.
    pub randomize_request_timing: bool,
    /// Lower bound of the humanized delay, in milliseconds.
    pub min_delay_ms: u64,
    /// Upper bound of the humanized delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for AntiDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hide_webdriver_property: true,
            spoof_chrome_runtime: true,
            blocked_properties: [
                "webdriver",
                "__webdriver_evaluate",
                "__selenium_evaluate",
                "__webdriver_script_function",
                "__webdriver_script_func",
                "__webdriver_script_fn",
                "__fxdriver_evaluate",
                "__driver_unwrapped",
                "webdriver_id",
                "$chrome_asyncScriptInfo",
                "$cdc_asdjflasutopfhvcZLmcfl_", // ChromeDriver marker
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            blocked_script_patterns: [
                "puppeteer",
                "playwright",
                "selenium",
                "webdriver",
                "headless",
                "__nightmare",
                "_phantom",
                "callPhantom",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            randomize_request_timing: true,
            min_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_internally_consistent() {
        let navigator = NavigatorConfig::default();
        let screen = ScreenConfig::default();
        let timezone = TimezoneConfig::default();

        // The default persona is a Windows desktop; the pieces a page
        // cross-checks have to agree with each other.
        assert!(navigator.user_agent.contains("Windows NT 10.0"));
        assert_eq!(navigator.platform, "Win32");
        assert!(screen.width >= screen.height);
        assert_eq!(timezone.offset_minutes, -300);
    }

    #[test]
    fn test_noise_defaults_within_valid_range() {
        assert!((0.0..=1.0).contains(&CanvasConfig::default().noise_level));
        assert!((0.0..=1.0).contains(&WebGlConfig::default().buffer_noise_level));
        assert!((0.0..=1.0).contains(&AudioConfig::default().noise_level));
    }

    #[test]
    fn test_blocked_properties_cover_chromedriver_marker() {
        let anti = AntiDetectionConfig::default();

        assert!(anti
            .blocked_properties
            .iter()
            .any(|p| p.starts_with("$cdc_")));
        assert!(anti.min_delay_ms <= anti.max_delay_ms);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let canvas: CanvasConfig = toml::from_str("noise_level = 0.3").unwrap();

        assert!((canvas.noise_level - 0.3).abs() < f64::EPSILON);
        assert!(canvas.enabled);
        assert!(canvas.protect_image_data);
    }
}
