//! Session state machine and its background monitors.

use crate::{
    CoreResult,
    input::ActivityMonitor,
    recorder::{
        NoticeReceiver, ProcessHandle, ProcessProbe, RecorderNotice, RecorderSettings,
        RecorderState, Trigger, VideoRecorder,
    },
    session::{HostInfo, Metadata, SessionDir, SessionLog},
};

use std::{future::Future, path::PathBuf, pin::Pin, sync::Arc};

use tokio::{
    sync::{Mutex, watch},
    task::AbortHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, error, info, instrument, warn};

type MonitorFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Coordinates the video recorder, the session log, and session metadata.
///
/// Cheap to clone; all clones drive the same state machine. Transitions
/// are serialized by one async lock, so at most one session is ever
/// active and concurrent start/stop requests are applied one at a time.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    settings: RecorderSettings,
    host: HostInfo,
    probe: Arc<dyn ProcessProbe>,
    activity: Arc<ActivityMonitor>,
    log: SessionLog,
    slot: Mutex<Slot>,
    state_tx: watch::Sender<RecorderState>,
}

struct Slot {
    recorder: Box<dyn VideoRecorder>,
    notices: NoticeReceiver,
    session: Option<ActiveSession>,
    monitors: Monitors,
}

struct ActiveSession {
    target: ProcessHandle,
    dir: SessionDir,
    metadata: Metadata,
}

/// Abort handles for each monitor's body task.
#[derive(Default)]
struct Monitors {
    liveness: Option<AbortHandle>,
    inactivity: Option<AbortHandle>,
    duration_cap: Option<AbortHandle>,
}

impl Monitors {
    /// Abort every monitor except the one owned by `keep`.
    fn cancel_except(&mut self, keep: Trigger) {
        for (owner, handle) in [
            (Trigger::Liveness, &mut self.liveness),
            (Trigger::Inactivity, &mut self.inactivity),
            (Trigger::DurationCap, &mut self.duration_cap),
        ] {
            if owner != keep
                && let Some(handle) = handle.take()
            {
                handle.abort();
            }
        }
    }
}

#[derive(Default)]
struct DrainedNotices {
    started: Option<f64>,
    stopping: Option<f64>,
}

impl Slot {
    fn drain_notices(&mut self) -> DrainedNotices {
        let mut drained = DrainedNotices::default();
        while let Ok(notice) = self.notices.try_recv() {
            match notice {
                RecorderNotice::Started { timestamp } => drained.started = Some(timestamp),
                RecorderNotice::Stopping { timestamp } => drained.stopping = Some(timestamp),
            }
        }
        drained
    }
}

impl Orchestrator {
    /// Build an idle orchestrator around a recorder and a process probe.
    pub fn new(
        settings: RecorderSettings,
        host: HostInfo,
        recorder: Box<dyn VideoRecorder>,
        notices: NoticeReceiver,
        probe: Arc<dyn ProcessProbe>,
    ) -> Self {
        let (state_tx, _) = watch::channel(RecorderState::Idle);
        Self {
            inner: Arc::new(Inner {
                settings,
                host,
                probe,
                activity: Arc::new(ActivityMonitor::new()),
                log: SessionLog::new(),
                slot: Mutex::new(Slot {
                    recorder,
                    notices,
                    session: None,
                    monitors: Monitors::default(),
                }),
                state_tx,
            }),
        }
    }

    /// Current recording state.
    pub fn state(&self) -> RecorderState {
        *self.inner.state_tx.borrow()
    }

    /// Observe state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<RecorderState> {
        self.inner.state_tx.subscribe()
    }

    /// The log shared with input handlers; rows are kept only while recording.
    pub fn session_log(&self) -> SessionLog {
        self.inner.log.clone()
    }

    /// The last-input clock the inactivity monitor waits on.
    pub fn activity(&self) -> Arc<ActivityMonitor> {
        Arc::clone(&self.inner.activity)
    }

    /// Directory of the active session, if any.
    pub async fn session_dir(&self) -> Option<PathBuf> {
        let slot = self.inner.slot.lock().await;
        slot.session.as_ref().map(|s| s.dir.path().to_path_buf())
    }

    /// Start a session if none is active and a suitable target is in front.
    ///
    /// Returns `Ok(true)` when a session was started and `Ok(false)` when
    /// the request was a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory cannot be created or the
    /// video recorder refuses to start. The orchestrator stays idle.
    #[instrument(skip(self))]
    pub async fn start(&self, trigger: Trigger) -> CoreResult<bool> {
        let mut slot = self.inner.slot.lock().await;

        if slot.session.is_some() {
            debug!("Already recording, ignoring start");
            return Ok(false);
        }

        // A pending resume waiter loses to any other start.
        slot.monitors.cancel_except(trigger);

        let Some(target) = self.inner.probe.find_target() else {
            info!("No recordable target in the foreground");
            return Ok(false);
        };

        if !self.inner.probe.is_target_focused(&target) {
            info!(exe = %target.exe, "Target is not focused and fullscreen");
            return Ok(false);
        }

        if let Some(blocked) = self.inner.settings.blocked_entry(&target.exe) {
            warn!(
                exe = %target.exe,
                name = %blocked.name,
                reason = %blocked.reason,
                "Refusing to record blocked target"
            );
            return Ok(false);
        }

        self.begin_session(&mut slot, target.clone())?;
        self.spawn_monitors(&mut slot, &target);

        Ok(true)
    }

    /// Stop the active session.
    ///
    /// Never fails: each teardown step is attempted and failures are
    /// logged. Returns `true` when a session was stopped. A manual stop
    /// while idle cancels a pending inactivity resume.
    #[instrument(skip(self))]
    pub async fn stop(&self, trigger: Trigger) -> bool {
        let mut slot = self.inner.slot.lock().await;

        if slot.session.is_none() {
            if trigger == Trigger::Manual && slot.monitors.inactivity.is_some() {
                slot.monitors.cancel_except(trigger);
                info!("Cancelled pending resume");
            }
            debug!("Not recording, ignoring stop");
            return false;
        }

        slot.monitors.cancel_except(trigger);
        self.end_session(&mut slot).await
    }

    /// Stop any session and cancel every monitor.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        if self.stop(Trigger::Manual).await {
            info!("Session closed for shutdown");
        }
    }

    /// Allocate the directory, start the recorder, and arm the log.
    fn begin_session(&self, slot: &mut Slot, target: ProcessHandle) -> CoreResult<()> {
        let settings = &self.inner.settings;
        let dir = SessionDir::allocate(&settings.recording_root, &target.exe)?;
        let mut metadata = Metadata::begin(&target.exe, &self.inner.host, 0.0);

        // Stale notices from an earlier session must not leak into this one.
        slot.drain_notices();

        if let Err(e) = slot.recorder.start(dir.path()) {
            error!(error = ?e, dir = ?dir.path(), "Video recorder failed to start");
            if let Err(e) = std::fs::remove_dir(dir.path()) {
                warn!(error = ?e, dir = ?dir.path(), "Failed to remove unused session directory");
            }
            return Err(e);
        }

        let start_timestamp = match slot.drain_notices().started {
            Some(ts) => ts,
            None => {
                debug!("Recorder sent no start notice, using local clock");
                crate::input::unix_now()
            }
        };
        metadata.set_start_timestamp(start_timestamp);
        self.inner.log.open(start_timestamp);

        let state = RecorderState::Recording {
            started_at: tokio::time::Instant::now(),
            session_id: metadata.session_id(),
        };

        info!(
            session_id = %metadata.session_id(),
            exe = %target.exe,
            pid = target.pid,
            dir = ?dir.path(),
            "Recording started"
        );

        slot.session = Some(ActiveSession {
            target,
            dir,
            metadata,
        });
        self.inner.state_tx.send_replace(state);

        Ok(())
    }

    /// Tear down the active session. Monitors are left to the caller.
    async fn end_session(&self, slot: &mut Slot) -> bool {
        let Some(session) = slot.session.take() else {
            return false;
        };
        let settings = &self.inner.settings;
        let session_id = session.metadata.session_id();
        let duration = session.metadata.duration();

        if let Err(e) = slot.recorder.stop() {
            error!(session_id = %session_id, error = ?e, "Video recorder failed to stop");
        }

        let end_timestamp = slot
            .drain_notices()
            .stopping
            .unwrap_or_else(crate::input::unix_now);
        self.inner.log.close(end_timestamp);

        if let Err(e) = self.inner.log.finalize(&session.dir.log_path()) {
            error!(session_id = %session_id, error = ?e, "Failed to write session log");
        }

        if let Err(e) =
            session
                .metadata
                .finalize(end_timestamp, duration, &session.dir.metadata_path())
        {
            error!(session_id = %session_id, error = ?e, "Failed to write session metadata");
        }

        tokio::time::sleep(settings.stop_grace).await;

        if duration < settings.min_footage {
            info!(
                session_id = %session_id,
                duration_s = duration.as_secs_f64(),
                "Session too short, marking invalid"
            );
            if let Err(e) = session.dir.mark_invalid() {
                error!(session_id = %session_id, error = ?e, "Failed to mark session invalid");
            }
        }

        self.inner.state_tx.send_replace(RecorderState::Idle);
        info!(
            session_id = %session_id,
            duration_s = duration.as_secs_f64(),
            dir = ?session.dir.path(),
            "Recording stopped"
        );

        true
    }

    /// Close the current session and open a fresh one on the same target.
    ///
    /// Liveness and inactivity monitors keep running across the boundary.
    #[instrument(skip(self))]
    async fn rollover(&self) -> bool {
        let mut slot = self.inner.slot.lock().await;

        let Some(target) = slot.session.as_ref().map(|s| s.target.clone()) else {
            return false;
        };

        info!(exe = %target.exe, "Maximum duration reached, rolling over");
        self.end_session(&mut slot).await;

        if !self.inner.probe.is_target_alive(&target) {
            info!(exe = %target.exe, "Target exited during rollover");
            slot.monitors.cancel_except(Trigger::DurationCap);
            return false;
        }

        match self.begin_session(&mut slot, target) {
            Ok(()) => true,
            Err(e) => {
                error!(error = ?e, "Failed to restart after rollover");
                slot.monitors.cancel_except(Trigger::DurationCap);
                false
            }
        }
    }

    fn spawn_monitors(&self, slot: &mut Slot, target: &ProcessHandle) {
        // Replacing a handle detaches it; only the caller's own task can
        // still be running here.
        slot.monitors = Monitors {
            liveness: Some(self.supervise(
                Trigger::Liveness,
                self.liveness_monitor(target.clone()),
            )),
            inactivity: Some(self.supervise(Trigger::Inactivity, self.inactivity_monitor())),
            duration_cap: Some(self.supervise(Trigger::DurationCap, self.duration_cap_monitor())),
        };
    }

    /// Run `body` as its own task and stop the session if it panics.
    ///
    /// The returned handle aborts the body; a cancelled body is not a
    /// failure and leaves the session alone.
    fn supervise(&self, trigger: Trigger, body: MonitorFuture) -> AbortHandle {
        let task = tokio::spawn(body);
        let abort = task.abort_handle();

        let this = self.clone();
        tokio::spawn(async move {
            match task.await {
                Ok(()) => {}
                Err(e) if e.is_panic() => {
                    error!(monitor = ?trigger, error = ?e, "Monitor panicked, stopping session");
                    if this.stop(trigger).await {
                        info!(monitor = ?trigger, "Session stopped after monitor failure");
                    }
                }
                Err(_) => debug!(monitor = ?trigger, "Monitor cancelled"),
            }
        });

        abort
    }

    fn liveness_monitor(&self, target: ProcessHandle) -> MonitorFuture {
        let this = self.clone();
        Box::pin(async move {
            let mut ticker = interval(this.inner.settings.liveness_poll);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if !this.inner.probe.is_target_alive(&target) {
                    info!(exe = %target.exe, pid = target.pid, "Target process exited");
                    this.stop(Trigger::Liveness).await;
                    return;
                }
            }
        })
    }

    fn inactivity_monitor(&self) -> MonitorFuture {
        let this = self.clone();
        Box::pin(async move {
            let timeout = this.inner.settings.inactivity_timeout;
            this.inner.activity.wait_until_idle(timeout).await;

            // Subscribe before stopping so input during teardown still counts.
            let mut resumed = this.inner.activity.next_input();
            info!(idle_s = timeout.as_secs_f64(), "No input, stopping");
            if !this.stop(Trigger::Inactivity).await {
                return;
            }

            resumed.arrived().await;
            info!("Input resumed, restarting");
            if let Err(e) = this.start(Trigger::Inactivity).await {
                error!(error = ?e, "Failed to restart after inactivity");
            }
        })
    }

    fn duration_cap_monitor(&self) -> MonitorFuture {
        let this = self.clone();
        Box::pin(async move {
            loop {
                tokio::time::sleep(this.inner.settings.max_footage).await;
                if !this.rollover().await {
                    return;
                }
            }
        })
    }
}
