// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON in `$XDG_CONFIG_HOME/camera-ask/config.json`. Every field
//! has a default, so partial files are fine and a missing file means defaults.

use crate::constants::{APP_ID, CONFIG_FILE_NAME, DEFAULT_CAPTURE_QUALITY, DEFAULT_ENDPOINT};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::CaptureOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inference endpoint the photos are posted to
    pub endpoint: String,
    /// Capture quality as a fraction in [0, 1]
    pub capture_quality: f32,
    /// Camera index (see `camera-ask list`)
    pub camera_index: usize,
    /// Request timeout in seconds; unset means no timeout
    pub request_timeout_secs: Option<u64>,
    /// Mirror camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            capture_quality: DEFAULT_CAPTURE_QUALITY,
            camera_index: 0,
            request_timeout_secs: None,
            mirror_preview: false,
        }
    }
}

/// Values given on the command line; each one set wins over the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub capture_quality: Option<f32>,
    pub camera_index: Option<usize>,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_ID).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AppError::Config(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", path.display(), e)))?;
        info!(path = %path.display(), endpoint = %config.endpoint, "Config loaded");
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Config(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| AppError::Config(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Apply command line overrides on top of the loaded file
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(quality) = overrides.capture_quality {
            self.capture_quality = quality;
        }
        if let Some(index) = overrides.camera_index {
            self.camera_index = index;
        }
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions::new(self.capture_quality, true)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
