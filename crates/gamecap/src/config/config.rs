//! Configuration management for gamecap.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, eager validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        CaptureConfig, FootageConfig, HotkeysConfig, RecorderConfig, StorageConfig,
        TargetsConfig, project_dirs,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use gamecap_core::{hotkey::lookup_keycode, recorder::RecorderSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Highest sampling rate with a non-zero nanosecond poll interval.
const MAX_SAMPLE_RATE_HZ: u64 = 1_000_000_000;

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Input sampling.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Session length and monitor timing.
    #[serde(default)]
    pub footage: FootageConfig,
    /// Recordable and refused targets.
    #[serde(default)]
    pub targets: TargetsConfig,
    /// Start and stop hotkeys.
    #[serde(default)]
    pub hotkeys: HotkeysConfig,
    /// External video recorder.
    #[serde(default)]
    pub recorder: RecorderConfig,
    /// Session storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    ///
    /// The result is not validated; call [`validate`](Self::validate).
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(&config_path)?;
            info!(config_path = ?config_path, "Default config created");
            Ok(config)
        }
    }

    /// Load configuration from `path`. Missing fields take their defaults.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Reject configurations the recorder cannot run with.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<()> {
        let invalid = |reason: String| AppError::ConfigError {
            reason,
            location: ErrorLocation::from(Location::caller()),
        };

        if self.capture.fps == 0 {
            return Err(invalid("capture.fps must be at least 1".to_string()));
        }
        if self.capture.polls_per_frame == 0 {
            return Err(invalid(
                "capture.polls_per_frame must be at least 1".to_string(),
            ));
        }
        let sample_rate = u64::from(self.capture.fps) * u64::from(self.capture.polls_per_frame);
        if sample_rate > MAX_SAMPLE_RATE_HZ {
            return Err(invalid(format!(
                "capture.fps * capture.polls_per_frame ({sample_rate}) exceeds {MAX_SAMPLE_RATE_HZ}"
            )));
        }
        if self.footage.max_secs == 0 {
            return Err(invalid("footage.max_secs must be at least 1".to_string()));
        }
        if self.footage.min_secs > self.footage.max_secs {
            return Err(invalid(format!(
                "footage.min_secs ({}) exceeds footage.max_secs ({})",
                self.footage.min_secs, self.footage.max_secs
            )));
        }
        if self.footage.inactivity_secs == 0 {
            return Err(invalid(
                "footage.inactivity_secs must be at least 1".to_string(),
            ));
        }
        if self.footage.liveness_poll_ms == 0 {
            return Err(invalid(
                "footage.liveness_poll_ms must be at least 1".to_string(),
            ));
        }
        for (field, key) in [
            ("hotkeys.start_key", &self.hotkeys.start_key),
            ("hotkeys.stop_key", &self.hotkeys.stop_key),
        ] {
            if lookup_keycode(key).is_none() {
                return Err(invalid(format!("{field}: unknown key {key:?}")));
            }
        }

        Ok(())
    }

    /// Save configuration to the platform config directory.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Orchestrator settings derived from this configuration.
    pub fn recorder_settings(&self) -> RecorderSettings {
        RecorderSettings {
            recording_root: self.storage.recording_root.clone(),
            min_footage: self.footage.min(),
            max_footage: self.footage.max(),
            inactivity_timeout: self.footage.inactivity(),
            stop_grace: self.footage.stop_grace(),
            liveness_poll: self.footage.liveness_poll(),
            blocked: self.targets.blocked.clone(),
        }
    }

    /// Directory for rolling log files.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        let proj_dirs = project_dirs().ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(proj_dirs.data_dir().join("logs"))
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = project_dirs().ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}
