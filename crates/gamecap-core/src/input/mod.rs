mod activity;
mod debounce;
mod event;
mod source;
mod tracker;

pub use {
    activity::{ActivityMonitor, InputSignal},
    debounce::{EventDebouncer, KeyDebouncer},
    event::{EventCategory, InputEvent, TimedEvent, unix_now},
    source::RawEventSource,
    tracker::{EventHandler, EventTracker, poll_interval_for},
};
