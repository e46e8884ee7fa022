mod orchestrator;
mod probe;
mod recording_state;
mod settings;
mod video;

pub use {
    orchestrator::Orchestrator,
    probe::{ProcessHandle, ProcessProbe},
    recording_state::{RecorderState, Trigger},
    settings::{BlockedTarget, RecorderSettings, default_blocked_targets},
    video::{NoticeReceiver, RecorderNotice, RecorderNotifier, VideoRecorder, notice_channel},
};
