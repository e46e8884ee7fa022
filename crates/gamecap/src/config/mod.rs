mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod footage_config;
mod hotkeys_config;
mod recorder_config;
mod storage_config;
mod targets_config;

pub(crate) use {
    capture_config::CaptureConfig, config::Config, footage_config::FootageConfig,
    hotkeys_config::HotkeysConfig, recorder_config::RecorderConfig, storage_config::StorageConfig,
    targets_config::TargetsConfig,
};

use std::path::PathBuf;

use directories::ProjectDirs;

pub(crate) const DEFAULT_FPS: u32 = 60;
pub(crate) const DEFAULT_POLLS_PER_FRAME: u32 = 10;
pub(crate) const DEFAULT_MIN_SECS: u64 = 30;
pub(crate) const DEFAULT_MAX_SECS: u64 = 600;
pub(crate) const DEFAULT_INACTIVITY_SECS: u64 = 90;
pub(crate) const DEFAULT_STOP_GRACE_MS: u64 = 2000;
pub(crate) const DEFAULT_LIVENESS_POLL_MS: u64 = 500;
pub(crate) const DEFAULT_START_KEY: &str = "F4";
pub(crate) const DEFAULT_STOP_KEY: &str = "F5";
pub(crate) const DEFAULT_RECORDER_PROGRAM: &str = "obs-cli";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "gamecap", "GameCap")
}

pub(crate) fn default_fps() -> u32 {
    DEFAULT_FPS
}

pub(crate) fn default_polls_per_frame() -> u32 {
    DEFAULT_POLLS_PER_FRAME
}

pub(crate) fn default_min_secs() -> u64 {
    DEFAULT_MIN_SECS
}

pub(crate) fn default_max_secs() -> u64 {
    DEFAULT_MAX_SECS
}

pub(crate) fn default_inactivity_secs() -> u64 {
    DEFAULT_INACTIVITY_SECS
}

pub(crate) fn default_stop_grace_ms() -> u64 {
    DEFAULT_STOP_GRACE_MS
}

pub(crate) fn default_liveness_poll_ms() -> u64 {
    DEFAULT_LIVENESS_POLL_MS
}

pub(crate) fn default_start_key() -> String {
    DEFAULT_START_KEY.to_string()
}

pub(crate) fn default_stop_key() -> String {
    DEFAULT_STOP_KEY.to_string()
}

pub(crate) fn default_recorder_program() -> String {
    DEFAULT_RECORDER_PROGRAM.to_string()
}

pub(crate) fn default_recording_root() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("recordings"))
        .unwrap_or_else(|| PathBuf::from("recordings"))
}
