//! Configuration file loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::detect::DetectionPolicy;

use super::profile::{ConfigError, FingerprintConfig};

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Spoofing profile applied as the process-wide fallback.
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    /// Thresholds for the probe detector.
    #[serde(default)]
    pub detection: DetectionPolicy,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config = Self::from_toml(&content)?;
        info!(
            path = %path.as_ref().display(),
            profile = %config.fingerprint.profile_name,
            "loaded configuration file"
        );
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.fingerprint.validate()?;
        Ok(config)
    }
}
