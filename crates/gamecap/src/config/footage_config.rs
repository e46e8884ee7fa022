use crate::config::{
    default_inactivity_secs, default_liveness_poll_ms, default_max_secs, default_min_secs,
    default_stop_grace_ms,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session length and monitor timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootageConfig {
    /// Sessions shorter than this are marked invalid.
    #[serde(default = "default_min_secs")]
    pub min_secs: u64,
    /// Sessions roll over after this long.
    #[serde(default = "default_max_secs")]
    pub max_secs: u64,
    /// Seconds without input before a session stops.
    #[serde(default = "default_inactivity_secs")]
    pub inactivity_secs: u64,
    /// Delay after stopping the recorder before the session is released.
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
    /// How often the target process is checked.
    #[serde(default = "default_liveness_poll_ms")]
    pub liveness_poll_ms: u64,
}

impl FootageConfig {
    pub(crate) fn min(&self) -> Duration {
        Duration::from_secs(self.min_secs)
    }

    pub(crate) fn max(&self) -> Duration {
        Duration::from_secs(self.max_secs)
    }

    pub(crate) fn inactivity(&self) -> Duration {
        Duration::from_secs(self.inactivity_secs)
    }

    pub(crate) fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }

    pub(crate) fn liveness_poll(&self) -> Duration {
        Duration::from_millis(self.liveness_poll_ms)
    }
}

impl Default for FootageConfig {
    fn default() -> Self {
        Self {
            min_secs: default_min_secs(),
            max_secs: default_max_secs(),
            inactivity_secs: default_inactivity_secs(),
            stop_grace_ms: default_stop_grace_ms(),
            liveness_poll_ms: default_liveness_poll_ms(),
        }
    }
}
