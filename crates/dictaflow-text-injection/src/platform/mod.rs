//! # Input-event platform abstraction
//!
//! A narrow seam over the host OS input subsystem: key-event injection,
//! clipboard read/write, and foreground-window queries. Everything above this
//! trait is OS-agnostic; the Win32 implementation lives in `win32.rs`.

use crate::error::ClipboardError;
use serde::Serialize;
use std::sync::Arc;

#[cfg(windows)]
pub mod win32;

/// Non-character keys the engine synthesizes directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyCode {
    Enter,
    Tab,
    Backspace,
    Control,
    KeyV,
}

/// One OS-level input event. A whole injection is submitted as an ordered
/// batch of these in a single platform call, so character order is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    /// A single Unicode scalar delivered as code-point events rather than
    /// through a virtual-key mapping, so characters without a keyboard-layout
    /// mapping (emoji, CJK) still work. The platform expands scalars above
    /// the BMP into surrogate pairs.
    Unicode(char),
}

/// Window bounding rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Raw foreground-window data as reported by the platform. `process_name`
/// is `None` when the owning process exited between the handle fetch and
/// the name lookup.
#[derive(Debug, Clone)]
pub struct RawWindow {
    pub handle: u64,
    pub process_id: u32,
    pub process_name: Option<String>,
    pub rect: WindowRect,
}

/// The platform seam. Implementations must not panic; every failure is
/// reported as a `false` dispatch result or a `ClipboardError`.
pub trait InputPlatform: Send + Sync {
    /// Submit one ordered batch of input events in a single OS call.
    /// Returns true iff the OS accepted the full batch for dispatch. This is
    /// an inherent limitation: acceptance does not prove the target rendered
    /// the text, only that the OS delivered the synthetic input.
    fn dispatch(&self, batch: &[InputEvent]) -> bool;

    /// Snapshot of the current foreground window, or `None` when no window
    /// has keyboard focus.
    fn foreground_window(&self) -> Option<RawWindow>;

    /// Current clipboard text. `Ok(None)` means the clipboard is empty;
    /// `Err(ClipboardError::NonText)` means it holds content we cannot
    /// snapshot as text.
    fn clipboard_text(&self) -> Result<Option<String>, ClipboardError>;

    /// Replace the clipboard contents with `text`.
    fn set_clipboard_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Empty the clipboard.
    fn clear_clipboard(&self) -> Result<(), ClipboardError>;
}

/// The native platform for the current OS, if one is implemented.
pub fn native_platform() -> Option<Arc<dyn InputPlatform>> {
    #[cfg(windows)]
    {
        Some(Arc::new(win32::Win32Platform::new()))
    }
    #[cfg(not(windows))]
    {
        None
    }
}
