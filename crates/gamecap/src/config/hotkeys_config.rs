use crate::config::{default_start_key, default_stop_key};

use serde::{Deserialize, Serialize};

/// Hotkey bindings, as key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeysConfig {
    /// Starts a session.
    #[serde(default = "default_start_key")]
    pub start_key: String,
    /// Stops the session.
    #[serde(default = "default_stop_key")]
    pub stop_key: String,
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        Self {
            start_key: default_start_key(),
            stop_key: default_stop_key(),
        }
    }
}
