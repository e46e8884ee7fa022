use gamecap_core::recorder::{BlockedTarget, default_blocked_targets};

use serde::{Deserialize, Serialize};

/// Which processes may be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetsConfig {
    /// Case-insensitive substrings of recordable executable names.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Targets refused even when allow-listed.
    #[serde(default = "default_blocked_targets")]
    pub blocked: Vec<BlockedTarget>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            blocked: default_blocked_targets(),
        }
    }
}
