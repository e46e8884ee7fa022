use crate::config::default_recording_root;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where sessions are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the session directory layout.
    #[serde(default = "default_recording_root")]
    pub recording_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            recording_root: default_recording_root(),
        }
    }
}
