use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tone: ToneConfig,
}

impl AppConfig {
    /// Parses a JSON configuration; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(?path, ?config, "loaded configuration");
        Ok(config)
    }
}

/// Parameters of the generated test tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Frequency of the sine wave in Hz.
    pub frequency: f32,
    pub seconds: f32,
    /// Peak level relative to full scale, 0.0 to 1.0.
    pub amplitude: f32,
    /// Write an extensible format chunk instead of the extended one.
    pub extensible: bool,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            frequency: 440.0,
            seconds: 1.0,
            amplitude: 0.5,
            extensible: false,
        }
    }
}
