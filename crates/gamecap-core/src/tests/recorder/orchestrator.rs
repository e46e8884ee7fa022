use crate::{
    CoreError, Orchestrator, Trigger,
    input::{InputEvent, TimedEvent},
    session::{LOG_FILE, METADATA_FILE, MetadataRecord, SessionDir},
    tests::recorder::support::{END_TS, FakeProbe, Harness, START_TS, session_dirs, settings},
};

use std::{path::Path, sync::atomic::Ordering, time::Duration};

use tokio::time::{Instant, sleep, sleep_until};

fn key_event(keycode: u16, down: bool) -> TimedEvent {
    TimedEvent::now(InputEvent::Keyboard { keycode, down })
}

#[allow(clippy::unwrap_used)]
async fn wait_idle(orchestrator: &Orchestrator) {
    let mut state = orchestrator.subscribe_state();
    state.wait_for(|s| !s.is_recording()).await.unwrap();
}

#[allow(clippy::unwrap_used)]
async fn wait_recording(orchestrator: &Orchestrator) {
    let mut state = orchestrator.subscribe_state();
    state.wait_for(|s| s.is_recording()).await.unwrap();
}

#[allow(clippy::unwrap_used)]
fn read_metadata(dir: &Path) -> MetadataRecord {
    serde_json::from_str(&std::fs::read_to_string(dir.join(METADATA_FILE)).unwrap()).unwrap()
}

#[allow(clippy::unwrap_used)]
fn log_lines(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join(LOG_FILE))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// WHAT: Starting while recording changes nothing
/// WHY: A double hotkey press must not open a second session
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_active_session_when_starting_again_then_no_op() {
    // Given: An active session
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    assert!(h.orchestrator.start(Trigger::Manual).await.unwrap());

    // When: Starting again
    let again = h.orchestrator.start(Trigger::Manual).await.unwrap();

    // Then: Nothing new was started
    assert!(!again);
    assert_eq!(h.calls(), vec!["start"]);
    assert_eq!(session_dirs(root.path(), "game").len(), 1);
}

/// WHAT: Concurrent starts produce exactly one session
/// WHY: Hotkey and resume paths can race
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_idle_orchestrator_when_two_starts_race_then_one_session() {
    // Given: An idle orchestrator
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));

    // When: Two starts run concurrently
    let (a, b) = tokio::join!(
        h.orchestrator.start(Trigger::Manual),
        h.orchestrator.start(Trigger::Manual)
    );

    // Then: Exactly one of them started a session
    assert!(a.unwrap() ^ b.unwrap());
    assert_eq!(h.calls(), vec!["start"]);
}

/// WHAT: Stopping while idle changes nothing
/// WHY: A stray stop must not touch the recorder or the disk
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_idle_orchestrator_when_stopping_then_no_op() {
    // Given: An idle orchestrator
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));

    // When: Stopping
    let stopped = h.orchestrator.stop(Trigger::Manual).await;

    // Then: Nothing happened
    assert!(!stopped);
    assert!(h.calls().is_empty());
    assert!(session_dirs(root.path(), "game").is_empty());
}

/// WHAT: A short manual session is written in full and marked invalid
/// WHY: Short clips are kept for audit but excluded from upload
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_five_second_session_when_stopped_then_rows_bracketed_and_marked_invalid() {
    // Given: A session with four appended events over five seconds
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    h.orchestrator.start(Trigger::Manual).await.unwrap();
    let log = h.orchestrator.session_log();
    for down in [true, false, true, false] {
        sleep(Duration::from_millis(1250)).await;
        assert!(log.append_event(&key_event(0x41, down)));
    }

    // When: Stopping manually
    assert!(h.orchestrator.stop(Trigger::Manual).await);

    // Then: The log holds START, the four events and END, and the session is invalid
    let dirs = session_dirs(root.path(), "game");
    assert_eq!(dirs.len(), 1);
    let lines = log_lines(&dirs[0]);
    assert_eq!(lines.len(), 1 + 4 + 2);
    assert!(lines[1].contains("START"));
    assert!(lines[6].contains("END"));
    assert!(SessionDir::open(&dirs[0]).is_invalid());
    assert!(!log.append_event(&key_event(0x41, true)));
    assert_eq!(h.calls(), vec!["start", "stop"]);
}

/// WHAT: A long enough session is not marked invalid
/// WHY: Only sessions under the minimum length are excluded
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_forty_second_session_when_stopped_then_upload_eligible() {
    // Given: A session kept busy for 40 seconds
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    h.orchestrator.start(Trigger::Manual).await.unwrap();
    let activity = h.orchestrator.activity();
    for _ in 0..40 {
        sleep(Duration::from_secs(1)).await;
        activity.record();
    }

    // When: Stopping manually
    h.orchestrator.stop(Trigger::Manual).await;

    // Then: The session is complete and eligible
    let dirs = session_dirs(root.path(), "game");
    let session = SessionDir::open(&dirs[0]);
    assert!(!session.is_invalid());
    assert!(session.is_upload_eligible());
    let duration = read_metadata(&dirs[0]).duration;
    assert!((duration - 40.0).abs() < 0.5, "duration {duration}");
}

/// WHAT: Session timestamps come from the recorder's notifications
/// WHY: Footage and input log must share one clock
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recorder_notices_when_session_closes_then_recorder_timestamps_used() {
    // Given: A recorder that announces fixed start and stop times
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    h.orchestrator.start(Trigger::Manual).await.unwrap();

    // When: Stopping
    h.orchestrator.stop(Trigger::Manual).await;

    // Then: Metadata and log markers carry the recorder's timestamps
    let dirs = session_dirs(root.path(), "game");
    let metadata = read_metadata(&dirs[0]);
    assert_eq!(metadata.start_timestamp, START_TS);
    assert_eq!(metadata.end_timestamp, END_TS);
    assert_eq!(metadata.target_exe, "Game.exe");
    let lines = log_lines(&dirs[0]);
    assert!(lines[1].starts_with(&format!("{START_TS},START")));
    assert!(lines[2].starts_with(&format!("{END_TS},END")));
}

/// WHAT: Five seconds of typing then silence ends the session at t=25
/// WHY: Idle sessions stop on their own after the inactivity timeout
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_input_until_five_seconds_when_idle_for_twenty_then_session_stops_invalid() {
    // Given: A session with key edges between t=1 and t=5
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    let t0 = Instant::now();
    h.orchestrator.start(Trigger::Manual).await.unwrap();
    let log = h.orchestrator.session_log();
    let activity = h.orchestrator.activity();
    for (i, at_ms) in [1000u64, 2000, 3000, 4000, 4500, 5000].into_iter().enumerate() {
        sleep_until(t0 + Duration::from_millis(at_ms)).await;
        assert!(log.append_event(&key_event(0x41, i % 2 == 0)));
        activity.record();
    }

    // When: No more input arrives
    wait_idle(&h.orchestrator).await;

    // Then: Stop began at t=25 and the session is 25s long and invalid
    let released_at = t0.elapsed();
    assert!(released_at >= Duration::from_secs(25), "{released_at:?}");
    assert!(released_at < Duration::from_secs(27), "{released_at:?}");
    assert_eq!(h.calls(), vec!["start", "stop"]);

    let dirs = session_dirs(root.path(), "game");
    assert_eq!(dirs.len(), 1);
    assert!(SessionDir::open(&dirs[0]).is_invalid());
    assert_eq!(log_lines(&dirs[0]).len(), 1 + 6 + 2);
    let duration = read_metadata(&dirs[0]).duration;
    assert!((duration - 25.0).abs() < 0.5, "duration {duration}");
}

/// WHAT: Input after an inactivity stop starts a new session
/// WHY: Players who step away and come back keep being recorded
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_inactivity_stop_when_input_resumes_then_new_session_starts() {
    // Given: A session that stopped for inactivity
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    h.orchestrator.start(Trigger::Manual).await.unwrap();
    wait_idle(&h.orchestrator).await;
    sleep(Duration::from_secs(5)).await;

    // When: Input arrives
    h.orchestrator.activity().record();
    wait_recording(&h.orchestrator).await;

    // Then: A second session is running in a new directory
    assert_eq!(h.calls(), vec!["start", "stop", "start"]);
    assert_eq!(session_dirs(root.path(), "game").len(), 2);
}

/// WHAT: A manual stop while idle cancels the pending resume
/// WHY: Pressing stop must mean stop, even after an idle timeout
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_pending_resume_when_stopped_manually_then_input_does_not_restart() {
    // Given: A session that stopped for inactivity and is waiting for input
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    h.orchestrator.start(Trigger::Manual).await.unwrap();
    wait_idle(&h.orchestrator).await;

    // When: Stopping manually, then producing input
    assert!(!h.orchestrator.stop(Trigger::Manual).await);
    h.orchestrator.activity().record();
    sleep(Duration::from_secs(5)).await;

    // Then: Nothing restarted
    assert!(!h.orchestrator.state().is_recording());
    assert_eq!(h.calls(), vec!["start", "stop"]);
}

/// WHAT: The session stops when the target process exits, without resuming
/// WHY: There is nothing to record once the game has closed
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_target_exits_when_liveness_checked_then_session_stops_for_good() {
    // Given: An active session
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    let t0 = Instant::now();
    h.orchestrator.start(Trigger::Manual).await.unwrap();

    // When: The target exits at t=3
    sleep(Duration::from_secs(3)).await;
    h.alive.store(false, Ordering::SeqCst);
    wait_idle(&h.orchestrator).await;

    // Then: Stop happened within a poll interval plus grace
    assert!(t0.elapsed() < Duration::from_secs(5));
    assert_eq!(h.calls(), vec!["start", "stop"]);

    // And: Later input does not restart anything
    h.orchestrator.activity().record();
    sleep(Duration::from_secs(60)).await;
    assert_eq!(h.calls(), vec!["start", "stop"]);
}

/// WHAT: A session reaching the maximum length rolls over into a new one
/// WHY: Footage is split into bounded files without losing recording time
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_continuous_input_when_max_duration_reached_then_session_rolls_over() {
    // Given: A session with steady input and a long inactivity timeout
    let root = tempfile::tempdir().unwrap();
    let mut settings = settings(root.path());
    settings.inactivity_timeout = Duration::from_secs(90);
    let h = Harness::new(settings, FakeProbe::running("Game.exe"));
    let t0 = Instant::now();
    h.orchestrator.start(Trigger::Manual).await.unwrap();
    let activity = h.orchestrator.activity();
    let feeder = tokio::spawn(async move {
        loop {
            sleep(Duration::from_secs(1)).await;
            activity.record();
        }
    });

    // When: Running for 610 seconds, then stopping manually
    sleep_until(t0 + Duration::from_secs(610)).await;
    assert!(h.orchestrator.state().is_recording());
    h.orchestrator.stop(Trigger::Manual).await;
    feeder.abort();

    // Then: Two sessions exist; the first is full length, the second short
    assert_eq!(h.calls(), vec!["start", "stop", "start", "stop"]);
    let dirs = session_dirs(root.path(), "game");
    assert_eq!(dirs.len(), 2);

    let (short, full): (Vec<_>, Vec<_>) = dirs
        .iter()
        .partition(|d| SessionDir::open(d.as_path()).is_invalid());
    assert_eq!(short.len(), 1);
    assert_eq!(full.len(), 1);
    let full_duration = read_metadata(full[0]).duration;
    assert!((full_duration - 600.0).abs() < 0.5, "duration {full_duration}");
    assert_eq!(SessionDir::scan(root.path()).unwrap().len(), 1);
}

/// WHAT: A recorder start failure leaves the orchestrator idle
/// WHY: A half-started session would leak an armed log
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_failing_recorder_when_starting_then_error_and_idle() {
    // Given: A recorder that refuses to start
    let root = tempfile::tempdir().unwrap();
    let h = Harness::with_failing_recorder(settings(root.path()), FakeProbe::running("Game.exe"));

    // When: Starting
    let result = h.orchestrator.start(Trigger::Manual).await;

    // Then: The error surfaces and nothing is left behind
    assert!(matches!(result, Err(CoreError::RecorderStart { .. })));
    assert!(!h.orchestrator.state().is_recording());
    assert!(!h.orchestrator.session_log().is_armed());
    assert!(session_dirs(root.path(), "game").is_empty());
}

/// WHAT: Blocked, unfocused and absent targets are not recorded
/// WHY: Recording only happens for an allowed game in the foreground
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_unrecordable_targets_when_starting_then_no_session() {
    // Given: A blocked target, an unfocused target, and no target at all
    let root = tempfile::tempdir().unwrap();
    let blocked = FakeProbe::running("Minecraft.exe");
    let mut unfocused = FakeProbe::running("Game.exe");
    unfocused.focused = false;
    let mut absent = FakeProbe::running("Game.exe");
    absent.target = None;

    for probe in [blocked, unfocused, absent] {
        let h = Harness::new(settings(root.path()), probe);

        // When: Starting
        let started = h.orchestrator.start(Trigger::Manual).await.unwrap();

        // Then: Nothing happened
        assert!(!started);
        assert!(h.calls().is_empty());
    }
    assert!(session_dirs(root.path(), "minecraft").is_empty());
    assert!(session_dirs(root.path(), "game").is_empty());
}

/// WHAT: Shutdown closes the session and silences every monitor
/// WHY: No background task may start a session after exit begins
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_active_session_when_shutting_down_then_stopped_and_no_restart() {
    // Given: An active session
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    h.orchestrator.start(Trigger::Manual).await.unwrap();

    // When: Shutting down, then waiting past every monitor deadline with input
    h.orchestrator.shutdown().await;
    h.orchestrator.activity().record();
    sleep(Duration::from_secs(700)).await;
    h.orchestrator.activity().record();
    sleep(Duration::from_secs(5)).await;

    // Then: Only the one session ever ran
    assert!(!h.orchestrator.state().is_recording());
    assert_eq!(h.calls(), vec!["start", "stop"]);
}

/// WHAT: A monitor that panics still stops the session
/// WHY: A recording must never keep running without its supervisors
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_panicking_liveness_monitor_when_recording_then_session_stopped() {
    // Given: A liveness period the timer rejects, so the monitor panics
    let root = tempfile::tempdir().unwrap();
    let mut settings = settings(root.path());
    settings.liveness_poll = Duration::ZERO;
    let h = Harness::new(settings, FakeProbe::running("Game.exe"));

    // When: Starting a session
    assert!(h.orchestrator.start(Trigger::Manual).await.unwrap());
    wait_idle(&h.orchestrator).await;

    // Then: The recorder was stopped and the session fully written
    assert_eq!(h.calls(), vec!["start", "stop"]);
    let dirs = session_dirs(root.path(), "game");
    assert_eq!(dirs.len(), 1);
    assert_eq!(log_lines(&dirs[0]).len(), 1 + 2);
    assert_eq!(read_metadata(&dirs[0]).end_timestamp, END_TS);

    // And: The surviving monitors were cancelled with it
    h.orchestrator.activity().record();
    sleep(Duration::from_secs(700)).await;
    assert_eq!(h.calls(), vec!["start", "stop"]);
}

/// WHAT: A recorder that fails to stop still gets a complete teardown
/// WHY: Log and metadata must be kept and the state must return to idle
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recorder_stop_failure_when_stopping_then_files_written_and_idle() {
    // Given: An active session whose recorder errors on stop
    let root = tempfile::tempdir().unwrap();
    let h = Harness::with_failing_stop(settings(root.path()), FakeProbe::running("Game.exe"));
    h.orchestrator.start(Trigger::Manual).await.unwrap();
    assert!(h.orchestrator.session_log().append_event(&key_event(0x41, true)));

    // When: Stopping
    let stopped = h.orchestrator.stop(Trigger::Manual).await;

    // Then: Teardown completed with the local clock standing in for the end time
    assert!(stopped);
    assert!(!h.orchestrator.state().is_recording());
    assert_eq!(h.calls(), vec!["start", "stop"]);

    let dirs = session_dirs(root.path(), "game");
    let lines = log_lines(&dirs[0]);
    assert_eq!(lines.len(), 1 + 1 + 2);
    assert!(lines[3].contains("END"));
    let metadata = read_metadata(&dirs[0]);
    assert_eq!(metadata.start_timestamp, START_TS);
    assert!(metadata.end_timestamp > START_TS);
    assert_ne!(metadata.end_timestamp, END_TS);
}

/// WHAT: A log that cannot be written does not prevent the metadata write
/// WHY: Each teardown file is attempted on its own
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_unwritable_log_when_stopping_then_metadata_still_written() {
    // Given: An active session whose log path is occupied by a directory
    let root = tempfile::tempdir().unwrap();
    let h = Harness::new(settings(root.path()), FakeProbe::running("Game.exe"));
    h.orchestrator.start(Trigger::Manual).await.unwrap();
    let dir = h.orchestrator.session_dir().await.unwrap();
    std::fs::create_dir(dir.join(LOG_FILE)).unwrap();

    // When: Stopping
    assert!(h.orchestrator.stop(Trigger::Manual).await);

    // Then: Metadata exists, the log does not, and the orchestrator is idle
    let metadata = read_metadata(&dir);
    assert_eq!(metadata.end_timestamp, END_TS);
    assert!(dir.join(LOG_FILE).is_dir());
    assert!(!SessionDir::open(&dir).is_upload_eligible());
    assert!(!h.orchestrator.session_log().is_armed());
    assert!(!h.orchestrator.state().is_recording());
    assert_eq!(h.calls(), vec!["start", "stop"]);
}

/// WHAT: A target that exits right before the maximum length ends recording
/// WHY: Rollover restarts only while the same target is still running
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_target_gone_at_max_duration_when_rolling_over_then_idle_without_restart() {
    // Given: Steady input, and a liveness check too slow to notice the exit
    let root = tempfile::tempdir().unwrap();
    let mut settings = settings(root.path());
    settings.inactivity_timeout = Duration::from_secs(90);
    settings.liveness_poll = Duration::from_secs(3600);
    let h = Harness::new(settings, FakeProbe::running("Game.exe"));
    let t0 = Instant::now();
    h.orchestrator.start(Trigger::Manual).await.unwrap();
    let activity = h.orchestrator.activity();
    let feeder_activity = h.orchestrator.activity();
    let feeder = tokio::spawn(async move {
        loop {
            sleep(Duration::from_secs(1)).await;
            feeder_activity.record();
        }
    });

    // When: The target exits at t=599 and the cap fires at t=600
    sleep_until(t0 + Duration::from_secs(599)).await;
    h.alive.store(false, Ordering::SeqCst);
    wait_idle(&h.orchestrator).await;
    feeder.abort();

    // Then: One full session, no restart
    assert!(t0.elapsed() >= Duration::from_secs(600));
    assert_eq!(h.calls(), vec!["start", "stop"]);
    let dirs = session_dirs(root.path(), "game");
    assert_eq!(dirs.len(), 1);
    assert!(SessionDir::open(&dirs[0]).is_upload_eligible());

    // And: No monitor is left to restart it
    activity.record();
    sleep(Duration::from_secs(700)).await;
    activity.record();
    sleep(Duration::from_secs(5)).await;
    assert!(!h.orchestrator.state().is_recording());
    assert_eq!(h.calls(), vec!["start", "stop"]);
}
