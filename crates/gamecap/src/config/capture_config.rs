use crate::config::{default_fps, default_polls_per_frame};

use serde::{Deserialize, Serialize};

/// Input sampling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Target frame rate of the video recording.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Input polls per video frame.
    #[serde(default = "default_polls_per_frame")]
    pub polls_per_frame: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            polls_per_frame: default_polls_per_frame(),
        }
    }
}
