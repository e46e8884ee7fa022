use crate::CoreResult;

use std::path::Path;

use tokio::sync::mpsc;

/// Lifecycle notification emitted by a [`VideoRecorder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecorderNotice {
    /// Frames are being written; seconds since the Unix epoch.
    Started {
        /// When recording actually began.
        timestamp: f64,
    },
    /// The recorder is finishing its file; seconds since the Unix epoch.
    Stopping {
        /// When recording actually ended.
        timestamp: f64,
    },
}

/// Sending half of the recorder notification channel.
#[derive(Debug, Clone)]
pub struct RecorderNotifier {
    tx: mpsc::UnboundedSender<RecorderNotice>,
}

impl RecorderNotifier {
    /// Report that recording started at `timestamp`.
    pub fn started(&self, timestamp: f64) {
        let _ = self.tx.send(RecorderNotice::Started { timestamp });
    }

    /// Report that recording is stopping at `timestamp`.
    pub fn stopping(&self, timestamp: f64) {
        let _ = self.tx.send(RecorderNotice::Stopping { timestamp });
    }
}

/// Receiving half of the recorder notification channel.
pub type NoticeReceiver = mpsc::UnboundedReceiver<RecorderNotice>;

/// Create a connected notifier/receiver pair.
pub fn notice_channel() -> (RecorderNotifier, NoticeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RecorderNotifier { tx }, rx)
}

/// A remote-controlled video recorder.
///
/// Implementations should announce [`RecorderNotice::Started`] before
/// `start` returns and [`RecorderNotice::Stopping`] before `stop` returns;
/// the orchestrator falls back to its own clock when a notice is missing.
pub trait VideoRecorder: Send {
    /// Begin recording into the session directory `dir`.
    fn start(&mut self, dir: &Path) -> CoreResult<()>;

    /// Stop the current recording.
    fn stop(&mut self) -> CoreResult<()>;
}
