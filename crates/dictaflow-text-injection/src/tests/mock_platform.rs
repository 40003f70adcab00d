//! Scriptable in-memory platform used across the crate's tests.

use crate::error::ClipboardError;
use crate::platform::{InputEvent, InputPlatform, RawWindow, WindowRect};
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Default)]
struct MockState {
    foreground: Option<RawWindow>,
    clipboard: Option<String>,
    clipboard_non_text: bool,
    clipboard_locked: bool,
    clipboard_read_fails_once: bool,
    clipboard_set_fails_once: bool,
    /// Scripted dispatch outcomes, consumed front to back; when exhausted
    /// the default outcome applies.
    scripted_dispatch: VecDeque<bool>,
    default_dispatch: bool,
    dispatched: Vec<Vec<InputEvent>>,
    clipboard_sets: Vec<String>,
}

/// Deterministic stand-in for the OS input subsystem.
pub struct MockPlatform {
    state: Mutex<MockState>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                default_dispatch: true,
                ..MockState::default()
            }),
        }
    }

    pub fn set_foreground(&self, process_name: &str, process_id: u32) {
        self.state.lock().foreground = Some(RawWindow {
            handle: 0x7000,
            process_id,
            process_name: Some(process_name.to_string()),
            rect: WindowRect {
                left: 0,
                top: 0,
                right: 800,
                bottom: 600,
            },
        });
    }

    /// Raw control over the probe result, including a `None` process name
    /// to simulate the lookup racing with process exit.
    pub fn set_foreground_raw(&self, handle: u64, process_id: u32, process_name: Option<&str>) {
        self.state.lock().foreground = Some(RawWindow {
            handle,
            process_id,
            process_name: process_name.map(|s| s.to_string()),
            rect: WindowRect::default(),
        });
    }

    pub fn clear_foreground(&self) {
        self.state.lock().foreground = None;
    }

    pub fn set_clipboard(&self, text: &str) {
        let mut state = self.state.lock();
        state.clipboard = Some(text.to_string());
        state.clipboard_non_text = false;
    }

    pub fn set_clipboard_non_text(&self) {
        let mut state = self.state.lock();
        state.clipboard = None;
        state.clipboard_non_text = true;
    }

    /// The next `clipboard_text` call fails transiently; later calls work.
    pub fn fail_next_clipboard_read(&self) {
        self.state.lock().clipboard_read_fails_once = true;
    }

    /// The next `set_clipboard_text` call fails transiently; later calls
    /// work.
    pub fn fail_next_clipboard_set(&self) {
        self.state.lock().clipboard_set_fails_once = true;
    }

    pub fn lock_clipboard(&self) {
        self.state.lock().clipboard_locked = true;
    }

    pub fn script_dispatch(&self, outcomes: Vec<bool>) {
        self.state.lock().scripted_dispatch = outcomes.into();
    }

    pub fn set_default_dispatch(&self, outcome: bool) {
        self.state.lock().default_dispatch = outcome;
    }

    pub fn dispatched_batches(&self) -> Vec<Vec<InputEvent>> {
        self.state.lock().dispatched.clone()
    }

    pub fn clipboard(&self) -> Option<String> {
        self.state.lock().clipboard.clone()
    }

    pub fn clipboard_is_non_text(&self) -> bool {
        self.state.lock().clipboard_non_text
    }

    /// Every value that passed through `set_clipboard_text`, in order.
    pub fn clipboard_set_history(&self) -> Vec<String> {
        self.state.lock().clipboard_sets.clone()
    }
}

impl InputPlatform for MockPlatform {
    fn dispatch(&self, batch: &[InputEvent]) -> bool {
        let mut state = self.state.lock();
        state.dispatched.push(batch.to_vec());
        state
            .scripted_dispatch
            .pop_front()
            .unwrap_or(state.default_dispatch)
    }

    fn foreground_window(&self) -> Option<RawWindow> {
        self.state.lock().foreground.clone()
    }

    fn clipboard_text(&self) -> Result<Option<String>, ClipboardError> {
        let mut state = self.state.lock();
        if state.clipboard_read_fails_once {
            state.clipboard_read_fails_once = false;
            return Err(ClipboardError::Os("transient read failure".into()));
        }
        if state.clipboard_locked {
            return Err(ClipboardError::Unavailable);
        }
        if state.clipboard_non_text {
            return Err(ClipboardError::NonText);
        }
        Ok(state.clipboard.clone())
    }

    fn set_clipboard_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut state = self.state.lock();
        if state.clipboard_set_fails_once {
            state.clipboard_set_fails_once = false;
            return Err(ClipboardError::Os("transient set failure".into()));
        }
        if state.clipboard_locked {
            return Err(ClipboardError::Unavailable);
        }
        state.clipboard = Some(text.to_string());
        state.clipboard_non_text = false;
        state.clipboard_sets.push(text.to_string());
        Ok(())
    }

    fn clear_clipboard(&self) -> Result<(), ClipboardError> {
        let mut state = self.state.lock();
        if state.clipboard_locked {
            return Err(ClipboardError::Unavailable);
        }
        state.clipboard = None;
        state.clipboard_non_text = false;
        Ok(())
    }
}
