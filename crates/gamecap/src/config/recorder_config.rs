use crate::config::default_recorder_program;

use serde::{Deserialize, Serialize};

/// External video recorder command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Executable to launch.
    #[serde(default = "default_recorder_program")]
    pub program: String,
    /// Arguments; `{dir}` is replaced with the session directory.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            program: default_recorder_program(),
            args: Vec::new(),
        }
    }
}
