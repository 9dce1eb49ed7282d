//! Protection configuration: domain settings, validation, resolution.
//!
//! A [`FingerprintConfig`] is a plain value describing what to spoof
//! and how strongly. The [`ConfigResolver`] maps context identities to
//! effective configurations; everything else here is the shape of the
//! value itself.

mod domains;
mod file;
mod profile;
mod profiles;
mod resolver;

pub use domains::{
    AntiDetectionConfig, AudioConfig, CanvasConfig, FontConfig, GeolocationConfig,
    NavigatorConfig, ScreenConfig, TimezoneConfig, WebGlConfig, WebRtcConfig,
};
pub use file::FileConfig;
pub use profile::{ConfigError, FingerprintConfig};
pub use profiles::{DeviceProfile, ProfileLibrary};
pub use resolver::ConfigResolver;
