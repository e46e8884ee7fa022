use crate::session::target_stem;

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// A target that must never be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedTarget {
    /// Display name for logs.
    pub name: String,
    /// Lowercase executable stems that identify it.
    pub binaries: Vec<String>,
    /// Why it is refused.
    pub reason: String,
}

const ENOUGH_DATA_REASON: &str = "We have enough data for now.";

/// Targets refused out of the box.
pub fn default_blocked_targets() -> Vec<BlockedTarget> {
    let blocked = |name: &str, binaries: &[&str], reason: &str| BlockedTarget {
        name: name.to_string(),
        binaries: binaries.iter().map(|b| (*b).to_string()).collect(),
        reason: reason.to_string(),
    };

    vec![
        blocked("Minecraft", &["minecraft"], ENOUGH_DATA_REASON),
        blocked("Valorant", &["valorant-win64-shipping"], ENOUGH_DATA_REASON),
        blocked("Counter-Strike: Source", &["cstrike"], ENOUGH_DATA_REASON),
        blocked("Counter-Strike 2", &["cs2"], ENOUGH_DATA_REASON),
        blocked(
            "Roblox",
            &["robloxstudiobeta", "robloxplayerbeta"],
            "Roblox recordings do not currently work.",
        ),
    ]
}

/// Orchestrator timing and storage parameters.
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Root of the session layout.
    pub recording_root: PathBuf,
    /// Sessions shorter than this are marked invalid.
    pub min_footage: Duration,
    /// Sessions roll over after this long.
    pub max_footage: Duration,
    /// Sessions stop after this long without input.
    pub inactivity_timeout: Duration,
    /// Delay after stopping the recorder before the session is released.
    pub stop_grace: Duration,
    /// How often the liveness monitor checks the target.
    pub liveness_poll: Duration,
    /// Targets refused even when allow-listed.
    pub blocked: Vec<BlockedTarget>,
}

impl RecorderSettings {
    /// The deny-list entry matching `exe`, if any.
    pub fn blocked_entry(&self, exe: &str) -> Option<&BlockedTarget> {
        let stem = target_stem(exe);
        self.blocked
            .iter()
            .find(|b| b.binaries.iter().any(|bin| bin.eq_ignore_ascii_case(&stem)))
    }
}
