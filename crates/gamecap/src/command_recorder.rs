//! Video recorder driven by an external program.

use gamecap_core::{
    CoreError, CoreResult,
    input::unix_now,
    recorder::{RecorderNotifier, VideoRecorder},
};

use std::{
    panic::Location,
    path::Path,
    process::{Child, Command, Stdio},
};

use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Placeholder in configured arguments replaced with the session directory.
pub(crate) const DIR_PLACEHOLDER: &str = "{dir}";

/// Spawns the configured recorder per session and kills it on stop.
pub(crate) struct CommandRecorder {
    program: String,
    args: Vec<String>,
    notifier: RecorderNotifier,
    child: Option<Child>,
}

impl CommandRecorder {
    pub(crate) fn new(program: String, args: Vec<String>, notifier: RecorderNotifier) -> Self {
        Self {
            program,
            args,
            notifier,
            child: None,
        }
    }

    /// Arguments for a session writing into `dir`.
    pub(crate) fn args_for(&self, dir: &Path) -> Vec<String> {
        let dir = dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(DIR_PLACEHOLDER, &dir))
            .collect()
    }
}

impl VideoRecorder for CommandRecorder {
    #[track_caller]
    #[instrument(skip(self), fields(program = %self.program))]
    fn start(&mut self, dir: &Path) -> CoreResult<()> {
        if self.child.is_some() {
            return Err(CoreError::RecorderStart {
                reason: "recorder is already running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let child = Command::new(&self.program)
            .args(self.args_for(dir))
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| CoreError::RecorderStart {
                reason: format!("Failed to launch {}: {}", self.program, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(pid = child.id(), "Recorder process started");
        self.child = Some(child);
        self.notifier.started(unix_now());

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self), fields(program = %self.program))]
    fn stop(&mut self) -> CoreResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        self.notifier.stopping(unix_now());

        if let Ok(Some(status)) = child.try_wait() {
            warn!(status = %status, "Recorder process exited before stop");
            return Ok(());
        }

        child.kill().map_err(|e| CoreError::RecorderStop {
            reason: format!("Failed to stop {}: {}", self.program, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let status = child.wait().map_err(|e| CoreError::RecorderStop {
            reason: format!("Failed to reap {}: {}", self.program, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(status = %status, "Recorder process stopped");

        Ok(())
    }
}
