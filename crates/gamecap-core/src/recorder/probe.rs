/// A running process that qualifies for recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    /// OS process id.
    pub pid: u32,
    /// Executable file name.
    pub exe: String,
}

/// Discovers and watches the process being recorded.
pub trait ProcessProbe: Send + Sync {
    /// The allow-listed process currently in the foreground, if any.
    fn find_target(&self) -> Option<ProcessHandle>;

    /// Whether `handle` holds foreground focus and covers the display.
    fn is_target_focused(&self, handle: &ProcessHandle) -> bool;

    /// Whether `handle` is still running.
    fn is_target_alive(&self, handle: &ProcessHandle) -> bool;
}
