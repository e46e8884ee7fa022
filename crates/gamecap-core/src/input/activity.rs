//! Last-input clock shared between the tracker and the inactivity monitor.

use std::time::Duration;

use tokio::{sync::watch, time::Instant};

/// Records when input was last observed and lets tasks wait on it.
///
/// Backed by a `watch` channel holding the instant of the last event:
/// readers never block the poll loop, and waiters wake either on their
/// deadline or on the next change without polling.
#[derive(Debug)]
pub struct ActivityMonitor {
    last_input: watch::Sender<Instant>,
}

impl Default for ActivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityMonitor {
    /// Create a monitor whose clock starts now.
    pub fn new() -> Self {
        let (last_input, _) = watch::channel(Instant::now());
        Self { last_input }
    }

    /// Note that input was observed just now.
    pub fn record(&self) {
        self.last_input.send_replace(Instant::now());
    }

    /// Time since the last observed input.
    pub fn idle_duration(&self) -> Duration {
        self.last_input.borrow().elapsed()
    }

    /// Resolve once no input has been seen for `timeout`.
    pub async fn wait_until_idle(&self, timeout: Duration) {
        loop {
            let deadline = *self.last_input.borrow() + timeout;
            if Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep_until(deadline).await;
        }
    }

    /// A signal that fires on the first input recorded after this call.
    pub fn next_input(&self) -> InputSignal {
        InputSignal {
            rx: self.last_input.subscribe(),
        }
    }
}

/// Handle returned by [`ActivityMonitor::next_input`].
#[derive(Debug)]
pub struct InputSignal {
    rx: watch::Receiver<Instant>,
}

impl InputSignal {
    /// Wait for input. Returns immediately if input already arrived.
    pub async fn arrived(&mut self) {
        // The sender lives as long as the monitor, which outlives every waiter.
        if self.rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
