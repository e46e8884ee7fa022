use crate::{CoreError, CoreResult, session::atomic::write_atomic};

use std::{panic::Location, path::Path, time::Duration};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

/// CPU description captured once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuSpecs {
    /// Logical name reported by the OS.
    pub name: String,
    /// Marketing brand string.
    pub brand: String,
    /// Vendor identifier.
    pub vendor: String,
    /// Logical core count.
    pub cores: usize,
    /// Reported frequency.
    pub frequency_mhz: u64,
}

/// Operating-system description captured once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSpecs {
    /// OS name.
    pub os_name: Option<String>,
    /// OS version.
    pub os_version: Option<String>,
    /// Kernel version.
    pub kernel_version: Option<String>,
    /// Host name.
    pub hostname: Option<String>,
    /// Installed memory.
    pub total_memory_gb: f64,
}

/// Hardware inventory attached to every session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSpecs {
    /// Primary CPU.
    pub cpu: CpuSpecs,
    /// Operating system.
    pub system: SystemSpecs,
}

/// Host identity shared by every session of one process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Stable machine identifier, if one could be read.
    pub hardware_id: Option<String>,
    /// Hardware inventory, if it could be gathered.
    pub specs: Option<HostSpecs>,
}

/// Persisted contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Unique per session.
    pub session_id: String,
    /// Executable name of the recorded target.
    pub target_exe: String,
    /// Stable machine identifier.
    pub hardware_id: Option<String>,
    /// Hardware inventory.
    pub host: Option<HostSpecs>,
    /// Recording start, seconds since the Unix epoch.
    pub start_timestamp: f64,
    /// Recording end, seconds since the Unix epoch.
    pub end_timestamp: f64,
    /// Monotonic session length in seconds.
    pub duration: f64,
}

/// Descriptive record for the active session.
///
/// Wall-clock timestamps come from the video recorder's notifications
/// when available; duration always comes from the monotonic clock.
#[derive(Debug, Clone)]
pub struct Metadata {
    session_id: Uuid,
    target_exe: String,
    host: HostInfo,
    start_timestamp: f64,
    started_at: Instant,
}

impl Metadata {
    /// Open metadata for a session starting now.
    pub fn begin(target_exe: impl Into<String>, host: &HostInfo, start_timestamp: f64) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            target_exe: target_exe.into(),
            host: host.clone(),
            start_timestamp,
            started_at: Instant::now(),
        }
    }

    /// Session identifier.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Recording start, seconds since the Unix epoch.
    pub fn start_timestamp(&self) -> f64 {
        self.start_timestamp
    }

    /// Replace the start timestamp with the recorder's authoritative one.
    pub fn set_start_timestamp(&mut self, timestamp: f64) {
        self.start_timestamp = timestamp;
    }

    /// Time elapsed since [`begin`](Self::begin).
    pub fn duration(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Close the record and write it to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MetadataWrite`] if serialization or the write fails.
    #[track_caller]
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn finalize(
        &self,
        end_timestamp: f64,
        duration: Duration,
        path: &Path,
    ) -> CoreResult<MetadataRecord> {
        let record = MetadataRecord {
            session_id: self.session_id.to_string(),
            target_exe: self.target_exe.clone(),
            hardware_id: self.host.hardware_id.clone(),
            host: self.host.specs.clone(),
            start_timestamp: self.start_timestamp,
            end_timestamp,
            duration: duration.as_secs_f64(),
        };

        let json =
            serde_json::to_string_pretty(&record).map_err(|e| CoreError::MetadataWrite {
                path: path.to_path_buf(),
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        write_atomic(path, json.as_bytes()).map_err(|e| CoreError::MetadataWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?path, duration_s = record.duration, "Metadata written");

        Ok(record)
    }
}
