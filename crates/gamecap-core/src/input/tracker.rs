use crate::{
    CoreError, CoreResult,
    input::{ActivityMonitor, EventCategory, EventDebouncer, RawEventSource, TimedEvent},
};

use std::{collections::HashMap, panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, watch},
    time::MissedTickBehavior,
};
use tracing::{debug, info, instrument, trace};

/// Synchronous per-category event handler.
pub type EventHandler = Arc<dyn Fn(&TimedEvent) + Send + Sync>;

/// Poll interval that samples `polls_per_frame` times per frame at `fps`.
///
/// Zero inputs are clamped to one, and the result is never shorter than
/// one nanosecond.
pub fn poll_interval_for(fps: u32, polls_per_frame: u32) -> Duration {
    let rate = u64::from(fps.max(1)) * u64::from(polls_per_frame.max(1));
    Duration::from_nanos((1_000_000_000 / rate).max(1))
}

/// Polls a [`RawEventSource`] and turns it into a debounced event stream.
///
/// Button-like events pass through an [`EventDebouncer`] that only exists
/// while the tracker is running, so starting twice never stacks filters.
/// Every polled event (including suppressed repeats) counts as activity.
pub struct EventTracker<S> {
    source: S,
    activity: Arc<ActivityMonitor>,
    poll_interval: Duration,
    debouncer: Option<EventDebouncer>,
    handlers: HashMap<EventCategory, Vec<EventHandler>>,
}

impl<S: RawEventSource> EventTracker<S> {
    /// Create a stopped tracker over `source`.
    pub fn new(source: S, activity: Arc<ActivityMonitor>, poll_interval: Duration) -> Self {
        Self {
            source,
            activity,
            poll_interval,
            debouncer: None,
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for one category.
    pub fn on(&mut self, category: EventCategory, handler: EventHandler) {
        self.handlers.entry(category).or_default().push(handler);
    }

    /// Register `handler` for every category.
    pub fn on_any(&mut self, handler: EventHandler) {
        for category in EventCategory::ALL {
            self.on(category, Arc::clone(&handler));
        }
    }

    /// Whether events are currently being forwarded.
    pub fn is_running(&self) -> bool {
        self.debouncer.is_some()
    }

    /// Begin forwarding events. Calling this while running is a no-op.
    pub fn start(&mut self) {
        if self.debouncer.is_none() {
            self.debouncer = Some(EventDebouncer::new());
            debug!("Event tracker started");
        }
    }

    /// Stop forwarding events and forget every held key.
    pub fn stop(&mut self) {
        if self.debouncer.take().is_some() {
            debug!("Event tracker stopped");
        }
    }

    /// Time since the last polled event.
    pub fn idle_duration(&self) -> Duration {
        self.activity.idle_duration()
    }

    /// Poll the source once and dispatch whatever it yields.
    ///
    /// Returns the event if it was forwarded to handlers. Events polled
    /// while stopped are discarded.
    pub fn poll_once(&mut self) -> Option<TimedEvent> {
        let polled = self.source.poll()?;
        let debouncer = self.debouncer.as_mut()?;

        self.activity.record();

        let Some(event) = debouncer.apply(polled.event) else {
            trace!(event = ?polled.event, "Suppressed repeated press");
            return None;
        };

        let timed = TimedEvent {
            timestamp: polled.timestamp,
            event,
        };

        if let Some(handlers) = self.handlers.get(&event.category()) {
            for handler in handlers {
                handler(&timed);
            }
        }

        Some(timed)
    }

    /// Run the polling loop until `shutdown_rx` changes or the source is
    /// exhausted.
    ///
    /// Forwarded events are sent to `events_tx` in poll order. The source is
    /// closed and every polled event has been sent before this returns.
    #[instrument(skip_all)]
    pub async fn run(
        mut self,
        events_tx: mpsc::Sender<TimedEvent>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> CoreResult<()> {
        if !self.source.open() {
            return Err(CoreError::SourceUnavailable {
                reason: "open() returned false".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.start();

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            poll_interval_us = self.poll_interval.as_micros(),
            "Event tracker polling"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    info!("Event tracker shutting down");
                    break;
                }

                _ = ticker.tick() => {
                    match self.poll_once() {
                        Some(event) => {
                            if events_tx.send(event).await.is_err() {
                                debug!("Event receiver dropped, stopping tracker");
                                break;
                            }
                        }
                        None if self.source.is_exhausted() => {
                            info!("Event source exhausted, stopping tracker");
                            break;
                        }
                        None => {}
                    }
                }
            }
        }

        self.stop();
        self.source.close();

        Ok(())
    }
}
