use crate::input::TimedEvent;

/// A native input capability that yields already-timestamped events.
///
/// Implementations are owned by the [`EventTracker`](crate::EventTracker)
/// that polls them; there is no process-global handle.
pub trait RawEventSource: Send {
    /// Prepare the source for reading. Returns `false` if it is unavailable.
    fn open(&mut self) -> bool;

    /// Return the next pending event, if any. Must not block.
    fn poll(&mut self) -> Option<TimedEvent>;

    /// Release the source. Further polls return `None`.
    fn close(&mut self);

    /// Whether the source has ended and will never yield another event.
    fn is_exhausted(&self) -> bool {
        false
    }
}
