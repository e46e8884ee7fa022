//! In-memory session event log with an atomic CSV write-out.
//!
//! Each row has:
//! - `timestamp`: seconds since the Unix epoch (float)
//! - `event_type`: `KEYBOARD`, `MOUSE_BUTTON`, `MOUSE_MOVE`, `SCROLL`,
//!   `GAMEPAD_BUTTON`, `GAMEPAD_BUTTON_VALUE`, `GAMEPAD_AXIS`, or the
//!   `START`/`END` sentinels
//! - `event_args`: JSON array, see [`InputEvent::log_args`](crate::InputEvent::log_args)

use crate::{CoreError, CoreResult, input::TimedEvent, session::atomic::write_atomic};

use std::{
    panic::Location,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

/// CSV header line.
pub const LOG_HEADER: &str = "timestamp,event_type,event_args";

/// Sentinel type opening a session.
pub const START_MARKER: &str = "START";

/// Sentinel type closing a session.
pub const END_MARKER: &str = "END";

/// One buffered log row.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    /// Event type column.
    pub event_type: String,
    /// Event args column; must be a JSON array.
    pub event_args: Value,
}

impl LogRow {
    fn is_well_formed(&self) -> bool {
        self.timestamp.is_finite()
            && self.timestamp >= 0.0
            && !self.event_type.is_empty()
            && self.event_args.is_array()
    }

    fn to_csv_line(&self) -> String {
        format!(
            "{},{},{}\n",
            self.timestamp,
            csv_field(&self.event_type),
            quoted(&self.event_args.to_string()),
        )
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quoted(value)
    } else {
        value.to_string()
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Outcome of [`SessionLogWriter::finalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Rows serialized, sentinels included.
    pub written: usize,
    /// Malformed rows dropped.
    pub dropped: usize,
}

/// Buffers one session's rows until [`finalize`](Self::finalize).
///
/// Appends are only accepted between [`begin`](Self::begin) and
/// [`disarm`](Self::disarm); sentinel rows are always accepted so the
/// owner can close a disarmed buffer.
#[derive(Debug, Default)]
pub struct SessionLogWriter {
    rows: Vec<LogRow>,
    armed: bool,
}

impl SessionLogWriter {
    /// Create a disarmed, empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the buffer and start accepting appends.
    pub fn begin(&mut self) {
        self.rows.clear();
        self.armed = true;
    }

    /// Stop accepting appends. Buffered rows are kept.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Whether appends are currently accepted.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Number of buffered rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Buffered rows in append order.
    pub fn rows(&self) -> &[LogRow] {
        &self.rows
    }

    /// Append a row. Returns `false` (and drops it) when disarmed.
    pub fn append(&mut self, timestamp: f64, event_type: impl Into<String>, event_args: Value) -> bool {
        if !self.armed {
            return false;
        }
        self.rows.push(LogRow {
            timestamp,
            event_type: event_type.into(),
            event_args,
        });
        true
    }

    /// Append a captured event.
    pub fn append_event(&mut self, event: &TimedEvent) -> bool {
        self.append(
            event.timestamp,
            event.event.log_type(),
            event.event.log_args(),
        )
    }

    /// Append the `START` sentinel.
    pub fn mark_start(&mut self, timestamp: f64) {
        self.push_marker(timestamp, START_MARKER);
    }

    /// Append the `END` sentinel.
    pub fn mark_end(&mut self, timestamp: f64) {
        self.push_marker(timestamp, END_MARKER);
    }

    fn push_marker(&mut self, timestamp: f64, marker: &str) {
        self.rows.push(LogRow {
            timestamp,
            event_type: marker.to_string(),
            event_args: json!([]),
        });
    }

    /// Disarm, drop malformed rows, and write the rest to `path` as CSV.
    ///
    /// The buffer is cleared whether or not the write succeeds. An empty
    /// buffer produces a header-only file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogWrite`] if the file cannot be written.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn finalize(&mut self, path: &Path) -> CoreResult<FinalizeReport> {
        self.armed = false;
        let rows = std::mem::take(&mut self.rows);
        let original_len = rows.len();

        let mut contents = String::with_capacity(LOG_HEADER.len() + 1 + original_len * 48);
        contents.push_str(LOG_HEADER);
        contents.push('\n');

        let mut written = 0;
        for row in rows.iter().filter(|row| row.is_well_formed()) {
            contents.push_str(&row.to_csv_line());
            written += 1;
        }

        let dropped = original_len - written;
        if dropped > 0 {
            warn!(dropped, "Dropped malformed log rows");
        }

        write_atomic(path, contents.as_bytes()).map_err(|e| CoreError::LogWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?path, rows = written, "Event log written");

        Ok(FinalizeReport { written, dropped })
    }
}

/// Shared handle to the active session's [`SessionLogWriter`].
///
/// Event handlers only get [`append_event`](Self::append_event); the
/// lifecycle calls are reserved for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    inner: Arc<Mutex<SessionLogWriter>>,
}

impl SessionLog {
    /// Create a handle over a fresh, disarmed writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` if a session is armed.
    pub fn append_event(&self, event: &TimedEvent) -> bool {
        self.lock().append_event(event)
    }

    /// Whether a session is currently accepting appends.
    pub fn is_armed(&self) -> bool {
        self.lock().is_armed()
    }

    /// Clear, mark `START`, and arm in one critical section.
    pub(crate) fn open(&self, start_timestamp: f64) {
        let mut writer = self.lock();
        writer.begin();
        writer.mark_start(start_timestamp);
        debug!("Session log armed");
    }

    /// Disarm and mark `END` in one critical section.
    pub(crate) fn close(&self, end_timestamp: f64) {
        let mut writer = self.lock();
        writer.disarm();
        writer.mark_end(end_timestamp);
    }

    #[track_caller]
    pub(crate) fn finalize(&self, path: &Path) -> CoreResult<FinalizeReport> {
        self.lock().finalize(path)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionLogWriter> {
        // A poisoned lock still holds a consistent Vec; keep the rows.
        self.inner.lock().unwrap_or_else(|e| {
            error!("Session log lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
