// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::CameraFacing;
use crate::constants::{self, CaptureInterval};
use crate::errors::{AppError, AppResult};
use crate::upload::UploadConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Current on-disk config layout version
pub const CONFIG_VERSION: u32 = 1;

/// User configuration, persisted as JSON
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Layout version of the stored file
    pub version: u32,
    /// Counting service base URL
    pub api_url: String,
    /// Interval for timed capture
    pub capture_interval: CaptureInterval,
    /// Preferred camera facing (rear by default)
    pub camera_facing: CameraFacing,
    /// Last used camera device path
    pub last_camera_path: Option<String>,
    /// Save manual-mode shots to the photo directory
    pub persist_captures: bool,
    /// Photo directory override (default: ~/Pictures/flowercam)
    pub photo_directory: Option<PathBuf>,
    /// Upload request timeout in seconds
    pub upload_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api_url: constants::upload::DEFAULT_API_URL.to_string(),
            capture_interval: CaptureInterval::default(),
            camera_facing: CameraFacing::default(),
            last_camera_path: None,
            persist_captures: true,
            photo_directory: None,
            upload_timeout_secs: constants::upload::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(constants::APP_DIR).join("config.json"))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific file
    ///
    /// A missing file yields the defaults, a malformed one is an error.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        let config: Config = serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), version = config.version, "Config loaded");
        Ok(config)
    }

    /// Write to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Change the stored file without picking up runtime overrides
    ///
    /// The file is re-read, `change` is applied to it and the result written
    /// back, so environment and command line values never get persisted. A
    /// malformed file is left untouched.
    pub fn update_file(path: &Path, change: impl FnOnce(&mut Config)) -> AppResult<()> {
        let mut stored = Self::load_from(path)?;
        change(&mut stored);
        stored.save_to(path)
    }

    /// Apply the service URL overrides: environment first, then command line
    ///
    /// Blank values are ignored.
    pub fn with_overrides(
        mut self,
        env_api_url: Option<String>,
        cli_api_url: Option<String>,
    ) -> Self {
        for url in [env_api_url, cli_api_url].into_iter().flatten() {
            let url = url.trim();
            if !url.is_empty() {
                self.api_url = url.to_string();
            }
        }
        self
    }

    /// Read the service URL override from the process environment
    pub fn env_api_url() -> Option<String> {
        std::env::var(constants::env::API_URL).ok()
    }

    /// Upload settings derived from this config
    pub fn upload_config(&self) -> UploadConfig {
        UploadConfig {
            api_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.upload_timeout_secs.max(1)),
        }
    }

    /// Directory where photos are persisted
    pub fn photo_directory(&self) -> PathBuf {
        self.photo_directory
            .clone()
            .unwrap_or_else(crate::storage::default_photo_directory)
    }
}
