//! Built-in device profiles.
//!
//! A device profile bundles the identity-bearing values of a real
//! machine so a configuration can impersonate coherent hardware
//! instead of mixing a Windows user agent with Apple GPU strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::profile::FingerprintConfig;

/// Identity overlay for one device class.
///
/// Applying a profile rewrites what the device claims to be; it leaves
/// noise levels and enable switches alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Stable lookup key, e.g. `windows_chrome`.
    pub name: String,
    /// Human-readable summary of the impersonated device.
    pub description: String,
    /// Claimed browser identity.
    pub user_agent: String,
    /// Claimed `navigator.platform` value.
    pub platform: String,
    /// Claimed language preference list.
    pub languages: Vec<String>,
    /// Claimed logical CPU count.
    pub hardware_concurrency: u32,
    /// Claimed device memory in gigabytes.
    pub device_memory: u64,
    /// Claimed screen width in pixels.
    pub screen_width: u32,
    /// Claimed screen height in pixels.
    pub screen_height: u32,
    /// Claimed device pixel ratio.
    pub device_pixel_ratio: f64,
    /// Claimed unmasked GPU vendor.
    pub webgl_vendor: String,
    /// Claimed unmasked GPU renderer.
    pub webgl_renderer: String,
}

impl DeviceProfile {
    /// Overlays this profile's identity values onto a configuration.
    pub fn apply_to(&self, config: &mut FingerprintConfig) {
        config.navigator.user_agent = self.user_agent.clone();
        config.navigator.platform = self.platform.clone();
        config.navigator.languages = self.languages.clone();
        config.navigator.hardware_concurrency = self.hardware_concurrency;
        config.navigator.device_memory = self.device_memory;
        config.screen.width = self.screen_width;
        config.screen.height = self.screen_height;
        config.screen.device_pixel_ratio = self.device_pixel_ratio;
        config.webgl.vendor = self.webgl_vendor.clone();
        config.webgl.renderer = self.webgl_renderer.clone();
        config.touch();
    }
}

/// Collection of known device profiles keyed by name.
#[derive(Debug, Clone)]
pub struct ProfileLibrary {
    profiles: BTreeMap<String, DeviceProfile>,
}

impl ProfileLibrary {
    /// Builds the library of bundled profiles.
    pub fn bundled() -> Self {
        let mut profiles = BTreeMap::new();
        for profile in [windows_chrome(), macbook_safari(), linux_firefox()] {
            profiles.insert(profile.name.clone(), profile);
        }
        Self { profiles }
    }

    /// Looks up a profile by name.
    pub fn get(&self, name: &str) -> Option<&DeviceProfile> {
        self.profiles.get(name)
    }

    /// Looks up a profile, falling back to `windows_chrome` when the
    /// name is unknown.
    pub fn get_or_default(&self, name: &str) -> DeviceProfile {
        match self.profiles.get(name) {
            Some(profile) => profile.clone(),
            None => {
                warn!(profile = name, "unknown device profile, using windows_chrome");
                windows_chrome()
            }
        }
    }

    /// Registers or replaces a profile.
    pub fn insert(&mut self, profile: DeviceProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Profile names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// Number of registered profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the library holds no profiles.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileLibrary {
    fn default() -> Self {
        Self::bundled()
    }
}

fn windows_chrome() -> DeviceProfile {
    DeviceProfile {
        name: "windows_chrome".to_string(),
        description: "Windows 10 desktop running Chrome 120".to_string(),
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .to_string(),
        platform: "Win32".to_string(),
        languages: vec!["en-US".to_string(), "en".to_string()],
        hardware_concurrency: 8,
        device_memory: 8,
        screen_width: 1920,
        screen_height: 1080,
        device_pixel_ratio: 1.0,
        webgl_vendor: "Google Inc. (Intel)".to_string(),
        webgl_renderer: "ANGLE (Intel, Intel(R) UHD Graphics 620 Direct3D11 vs_5_0 ps_5_0, \
                         D3D11)"
            .to_string(),
    }
}

fn macbook_safari() -> DeviceProfile {
    DeviceProfile {
        name: "macbook_safari".to_string(),
        description: "MacBook Pro running Safari 17".to_string(),
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
                     (KHTML, like Gecko) Version/17.2 Safari/605.1.15"
            .to_string(),
        platform: "MacIntel".to_string(),
        languages: vec!["en-US".to_string(), "en".to_string()],
        hardware_concurrency: 10,
        device_memory: 16,
        screen_width: 2560,
        screen_height: 1600,
        device_pixel_ratio: 2.0,
        webgl_vendor: "Apple Inc.".to_string(),
        webgl_renderer: "Apple M2".to_string(),
    }
}

fn linux_firefox() -> DeviceProfile {
    DeviceProfile {
        name: "linux_firefox".to_string(),
        description: "Linux workstation running Firefox 121".to_string(),
        user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0"
            .to_string(),
        platform: "Linux x86_64".to_string(),
        languages: vec!["en-US".to_string(), "en".to_string()],
        hardware_concurrency: 8,
        device_memory: 8,
        screen_width: 1920,
        screen_height: 1080,
        device_pixel_ratio: 1.0,
        webgl_vendor: "Mesa".to_string(),
        webgl_renderer: "Mesa Intel(R) UHD Graphics 620 (KBL GT2)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_library_contents() {
        let library = ProfileLibrary::bundled();

        assert_eq!(
            library.names(),
            vec!["linux_firefox", "macbook_safari", "windows_chrome"]
        );
        assert!(!library.is_empty());
    }

    #[test]
    fn test_apply_overlays_identity_only() {
        let library = ProfileLibrary::bundled();
        let mut config = FingerprintConfig::default();
        let noise_before = config.canvas.noise_level;

        library.get("macbook_safari").unwrap().apply_to(&mut config);

        assert_eq!(config.navigator.platform, "MacIntel");
        assert_eq!(config.screen.width, 2560);
        assert_eq!(config.webgl.vendor, "Apple Inc.");
        assert!((config.canvas.noise_level - noise_before).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let library = ProfileLibrary::bundled();

        let profile = library.get_or_default("quantum_toaster");

        assert_eq!(profile.name, "windows_chrome");
        assert!(library.get("quantum_toaster").is_none());
    }

    #[test]
    fn test_every_bundled_profile_applies_cleanly() {
        let library = ProfileLibrary::bundled();

        for name in library.names() {
            let mut config = FingerprintConfig::default();
            library.get(name).unwrap().apply_to(&mut config);
            assert!(config.validate().is_ok(), "profile {name} broke validation");
        }
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut library = ProfileLibrary::bundled();
        let before = library.len();

        let mut custom = library.get_or_default("windows_chrome");
        custom.hardware_concurrency = 16;
        library.insert(custom);

        assert_eq!(library.len(), before);
        assert_eq!(
            library.get("windows_chrome").unwrap().hardware_concurrency,
            16
        );
    }
}
