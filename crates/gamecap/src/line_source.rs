//! Raw event source fed by JSON lines from a platform input hook.
//!
//! Each line is `{"timestamp": 1700000000.25, "event": {"type": "keyboard",
//! "keycode": 65, "down": true}}`; `timestamp` may be omitted, in which case
//! the line is stamped on arrival.

use gamecap_core::input::{InputEvent, RawEventSource, TimedEvent, unix_now};

use std::{
    io::{self, BufRead, BufReader},
    sync::mpsc,
    thread,
};

use serde::Deserialize;
use tracing::{debug, error, warn};

#[derive(Deserialize)]
struct BridgeLine {
    #[serde(default)]
    timestamp: Option<f64>,
    event: InputEvent,
}

/// Parse one bridge line. Blank lines and malformed input yield `None`.
pub(crate) fn parse_line(line: &str) -> Option<TimedEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<BridgeLine>(line) {
        Ok(parsed) => Some(TimedEvent {
            timestamp: parsed.timestamp.unwrap_or_else(unix_now),
            event: parsed.event,
        }),
        Err(e) => {
            warn!(error = %e, line, "Ignoring malformed input line");
            None
        }
    }
}

/// Reads bridge lines on a background thread and hands them to the tracker.
///
/// Once the stream ends and every parsed line has been polled, the source
/// reports itself exhausted.
pub(crate) struct LineEventSource<R> {
    reader: Option<R>,
    rx: Option<mpsc::Receiver<TimedEvent>>,
    exhausted: bool,
}

impl LineEventSource<BufReader<io::Stdin>> {
    /// Source over this process's standard input.
    pub(crate) fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R> LineEventSource<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            rx: None,
            exhausted: false,
        }
    }
}

impl<R: BufRead + Send + 'static> RawEventSource for LineEventSource<R> {
    fn open(&mut self) -> bool {
        let Some(reader) = self.reader.take() else {
            // A reader can only be consumed once.
            return self.rx.is_some();
        };

        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("input-lines".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            error!(error = ?e, "Input stream read failed");
                            break;
                        }
                    };
                    if let Some(event) = parse_line(&line)
                        && tx.send(event).is_err()
                    {
                        break;
                    }
                }
                debug!("Input stream closed");
            });

        match spawned {
            Ok(_) => {
                self.rx = Some(rx);
                true
            }
            Err(e) => {
                error!(error = ?e, "Failed to spawn input reader thread");
                false
            }
        }
    }

    fn poll(&mut self) -> Option<TimedEvent> {
        match self.rx.as_ref()?.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                if !self.exhausted {
                    debug!("Input stream drained");
                    self.exhausted = true;
                }
                None
            }
        }
    }

    fn close(&mut self) {
        // The reader thread exits on its next send.
        self.rx = None;
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
