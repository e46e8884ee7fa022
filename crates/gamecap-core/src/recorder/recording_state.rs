use tokio::time::Instant;
use uuid::Uuid;

/// Recording state published by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Not currently recording.
    Idle,
    /// A session is active.
    Recording {
        /// When the session started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
}

impl RecorderState {
    /// Whether a session is active.
    pub fn is_recording(&self) -> bool {
        matches!(self, RecorderState::Recording { .. })
    }
}

/// Who asked for a transition.
///
/// A monitor that initiates a stop is never cancelled by that stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Hotkey, shutdown, or another caller outside the monitors.
    Manual,
    /// The target-process liveness monitor.
    Liveness,
    /// The inactivity monitor.
    Inactivity,
    /// The maximum-duration monitor.
    DurationCap,
}
