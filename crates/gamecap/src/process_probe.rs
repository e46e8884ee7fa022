//! Target discovery over the OS process table.

use gamecap_core::recorder::{ProcessHandle, ProcessProbe};

use std::sync::{Mutex, MutexGuard};

use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{error, trace};

/// Finds allow-listed processes with `sysinfo`.
///
/// On Windows a target counts as focused when it owns the foreground
/// window and that window covers its monitor. Other platforms have no
/// focus check and treat every running target as focused.
pub(crate) struct SysinfoProbe {
    allow: Vec<String>,
    system: Mutex<System>,
}

impl SysinfoProbe {
    pub(crate) fn new(allow: &[String]) -> Self {
        Self {
            allow: allow.iter().map(|name| name.to_lowercase()).collect(),
            system: Mutex::new(System::new()),
        }
    }

    /// Whether `exe` matches any allow-list entry.
    pub(crate) fn is_allowed(&self, exe: &str) -> bool {
        let exe = exe.to_lowercase();
        self.allow
            .iter()
            .any(|name| !name.is_empty() && exe.contains(name.as_str()))
    }

    fn system(&self) -> MutexGuard<'_, System> {
        self.system.lock().unwrap_or_else(|e| {
            error!("Process table lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl ProcessProbe for SysinfoProbe {
    fn find_target(&self) -> Option<ProcessHandle> {
        if self.allow.is_empty() {
            trace!("Allow list is empty");
            return None;
        }

        let mut system = self.system();
        system.refresh_processes(ProcessesToUpdate::All, true);

        system
            .processes()
            .iter()
            .filter_map(|(pid, process)| {
                let exe = process.name().to_string_lossy().into_owned();
                self.is_allowed(&exe).then(|| ProcessHandle {
                    pid: pid.as_u32(),
                    exe,
                })
            })
            .min_by_key(|handle| handle.pid)
    }

    fn is_target_focused(&self, handle: &ProcessHandle) -> bool {
        let focused = foreground::is_fullscreen_foreground(handle.pid);
        if !focused {
            trace!(exe = %handle.exe, pid = handle.pid, "Target not fullscreen in the foreground");
        }
        focused
    }

    fn is_target_alive(&self, handle: &ProcessHandle) -> bool {
        let pid = Pid::from_u32(handle.pid);
        let mut system = self.system();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        system.process(pid).is_some()
    }
}

#[cfg(target_os = "windows")]
mod foreground {
    use windows::Win32::{
        Foundation::RECT,
        Graphics::Gdi::{GetMonitorInfoW, MONITOR_DEFAULTTOPRIMARY, MONITORINFO, MonitorFromWindow},
        UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowRect, GetWindowThreadProcessId},
    };

    /// Whether `pid` owns the foreground window and it fills its monitor.
    pub(super) fn is_fullscreen_foreground(pid: u32) -> bool {
        // SAFETY: read-only queries on the foreground window; every
        // out-pointer refers to a local that outlives the call.
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.is_invalid() {
                return false;
            }

            let mut owner = 0u32;
            if GetWindowThreadProcessId(hwnd, Some(&mut owner as *mut u32)) == 0 || owner != pid {
                return false;
            }

            let mut window = RECT::default();
            if GetWindowRect(hwnd, &mut window).is_err() {
                return false;
            }

            let monitor = MonitorFromWindow(hwnd, MONITOR_DEFAULTTOPRIMARY);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if !GetMonitorInfoW(monitor, &mut info).as_bool() {
                return false;
            }

            window == info.rcMonitor
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod foreground {
    pub(super) fn is_fullscreen_foreground(_pid: u32) -> bool {
        true
    }
}
