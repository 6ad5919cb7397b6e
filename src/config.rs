//! User configuration.
//!
//! The merge itself needs no configuration, but the location of the ffmpeg
//! binary, the normalization headroom and an optional log file can be set in
//! `~/.config/audio-merger/config.toml`. A missing file means defaults.

use crate::constants::{DEFAULT_FFMPEG, DEFAULT_HEADROOM_DB};
use crate::error::MergeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    #[serde(default = "default_headroom_db")]
    pub headroom_db: f32,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_ffmpeg_path() -> String {
    DEFAULT_FFMPEG.to_string()
}

fn default_headroom_db() -> f32 {
    DEFAULT_HEADROOM_DB
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            headroom_db: default_headroom_db(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf, MergeError> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("audio-merger")
        } else {
            dirs::config_dir()
                .ok_or_else(|| MergeError::Config("Unable to find config directory".into()))?
                .join("audio-merger")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, MergeError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, MergeError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, MergeError> {
        if !config_path.exists() {
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(config_path)
            .map_err(|e| MergeError::Config(format!("{}: {e}", config_path.display())))?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| MergeError::Config(format!("{}: {e}", config_path.display())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), MergeError> {
        if !self.headroom_db.is_finite() || self.headroom_db < 0.0 {
            return Err(MergeError::Config(format!(
                "headroom_db must be a non-negative number, got {}",
                self.headroom_db
            )));
        }
        if self.ffmpeg_path.trim().is_empty() {
            return Err(MergeError::Config("ffmpeg_path must not be empty".into()));
        }
        Ok(())
    }

    /// The ffmpeg program with `~` and environment variables expanded.
    pub fn ffmpeg_program(&self) -> String {
        shellexpand::full(&self.ffmpeg_path)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| self.ffmpeg_path.clone())
    }
}
