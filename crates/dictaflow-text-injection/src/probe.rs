//! # Window Prober
//!
//! Queries the platform for the current foreground window and decides whether
//! it is an acceptable injection target. Leaf dependency used by everything
//! else; every probe produces a fresh snapshot that is discarded after use.

use crate::platform::{InputPlatform, WindowRect};
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

/// Processes we never inject into: lock screen, logon UI, window-manager
/// chrome, and raw console hosts that are not an accepted terminal target.
pub const DENIED_PROCESSES: &[&str] = &[
    "logonui.exe",
    "lockapp.exe",
    "winlogon.exe",
    "csrss.exe",
    "dwm.exe",
    "consent.exe",
    "conhost.exe",
    "searchhost.exe",
    "shellexperiencehost.exe",
];

/// Case-insensitive membership test against the deny-list.
pub fn is_denied_process(process_name: &str) -> bool {
    let lower = process_name.to_lowercase();
    DENIED_PROCESSES.iter().any(|p| lower == *p)
}

/// Snapshot of the OS foreground window. Created fresh on every probe and
/// never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct WindowInfo {
    /// Opaque window handle, meaningful only to the platform that issued it.
    pub handle: u64,
    pub process_name: String,
    pub process_id: u32,
    pub rect: WindowRect,
    pub has_focus: bool,
}

impl WindowInfo {
    /// Snapshot representing "no focusable target". Partial data is cleared
    /// rather than carried, so downstream code never acts on stale fields.
    pub fn unfocused() -> Self {
        Self {
            handle: 0,
            process_name: String::new(),
            process_id: 0,
            rect: WindowRect::default(),
            has_focus: false,
        }
    }
}

/// Probes the platform for foreground-window state.
pub struct WindowProber {
    platform: Arc<dyn InputPlatform>,
}

impl WindowProber {
    pub fn new(platform: Arc<dyn InputPlatform>) -> Self {
        Self { platform }
    }

    /// Snapshot the current foreground window. Never fails: a missing window
    /// or a process-lookup race (process exited between the handle fetch and
    /// the name lookup) degrades to `has_focus = false`.
    pub fn probe(&self) -> WindowInfo {
        let Some(raw) = self.platform.foreground_window() else {
            trace!("no foreground window");
            return WindowInfo::unfocused();
        };

        let Some(process_name) = raw.process_name else {
            trace!(pid = raw.process_id, "process lookup raced with exit");
            return WindowInfo::unfocused();
        };

        WindowInfo {
            handle: raw.handle,
            process_name,
            process_id: raw.process_id,
            rect: raw.rect,
            has_focus: true,
        }
    }

    /// True iff a foreground window exists and its process is not on the
    /// deny-list of OS/shell processes.
    pub fn has_injectable_target(&self) -> bool {
        let window = self.probe();
        Self::is_injectable(&window)
    }

    /// Deny-list check against an existing snapshot, avoiding a second probe.
    pub fn is_injectable(window: &WindowInfo) -> bool {
        window.has_focus && !is_denied_process(&window.process_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mock_platform::MockPlatform;

    #[test]
    fn probe_without_foreground_window_is_unfocused() {
        let platform = Arc::new(MockPlatform::new());
        let prober = WindowProber::new(platform);

        let window = prober.probe();
        assert!(!window.has_focus);
        assert!(window.process_name.is_empty());
        assert_eq!(window.handle, 0);
        assert!(!prober.has_injectable_target());
    }

    #[test]
    fn probe_clears_partial_data_on_process_lookup_race() {
        let platform = MockPlatform::new();
        platform.set_foreground_raw(1234, 42, None);
        let prober = WindowProber::new(Arc::new(platform));

        let window = prober.probe();
        assert!(!window.has_focus);
        assert_eq!(window.process_id, 0);
        assert_eq!(window.handle, 0);
    }

    #[test]
    fn denied_processes_are_not_injectable() {
        let platform = MockPlatform::new();
        platform.set_foreground("LogonUI.exe", 7);
        let prober = WindowProber::new(Arc::new(platform));

        let window = prober.probe();
        assert!(window.has_focus);
        assert!(!WindowProber::is_injectable(&window));
        assert!(!prober.has_injectable_target());
    }

    #[test]
    fn ordinary_process_is_injectable() {
        let platform = MockPlatform::new();
        platform.set_foreground("notepad.exe", 7);
        let prober = WindowProber::new(Arc::new(platform));

        assert!(prober.has_injectable_target());
    }

    #[test]
    fn deny_list_check_is_case_insensitive() {
        assert!(is_denied_process("CONHOST.EXE"));
        assert!(is_denied_process("LockApp.exe"));
        assert!(!is_denied_process("chrome.exe"));
    }
}
