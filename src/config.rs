// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON in the platform config directory. A missing file yields the
//! defaults; a file that fails to parse is reported rather than silently
//! replaced.

use crate::constants::{
    DEFAULT_FRAME_RATE, DEFAULT_HEIGHT, DEFAULT_HIGHLIGHT_COLOR, DEFAULT_TOLERANCE, DEFAULT_WIDTH,
    DepthRange,
};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "depth-segmenter";

/// Config file name
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial region tolerance (mm)
    pub tolerance: u32,
    /// Member highlight color as `[r, g, b]`
    pub highlight_color: [u8; 3],
    /// Start with the camera overlay enabled
    pub use_camera_overlay: bool,
    /// Sensor operating range (Default or Near)
    pub depth_range: DepthRange,
    /// Sensor frame rate used by the synthetic source and capture loop
    pub frame_rate: u32,
    /// Synthetic sensor width
    pub width: u32,
    /// Synthetic sensor height
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.into(),
            use_camera_overlay: false,
            depth_range: DepthRange::default(),
            frame_rate: DEFAULT_FRAME_RATE,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, falling back to defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config.sanitized())
    }

    /// Save to the default location
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Replace values the pipeline cannot run with
    fn sanitized(mut self) -> Self {
        if self.frame_rate == 0 {
            self.frame_rate = DEFAULT_FRAME_RATE;
        }
        if self.width == 0 || self.height == 0 {
            self.width = DEFAULT_WIDTH;
            self.height = DEFAULT_HEIGHT;
        }
        self
    }
}
