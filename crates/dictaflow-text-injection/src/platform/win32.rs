//! Win32 implementation of the input-event platform.
//!
//! Uses:
//! - `SendInput` with `INPUT_KEYBOARD` for key and `KEYEVENTF_UNICODE` events
//! - `GetForegroundWindow` / `GetWindowThreadProcessId` /
//!   `QueryFullProcessImageNameW` for the window probe
//! - `OpenClipboard` / `GetClipboardData` / `SetClipboardData` for clipboard

use super::{InputEvent, InputPlatform, KeyCode, RawWindow, WindowRect};
use crate::error::ClipboardError;
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use tracing::debug;
use windows::core::PWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE, HGLOBAL, RECT};
use windows::Win32::System::DataExchange::{
    CloseClipboard, CountClipboardFormats, EmptyClipboard, GetClipboardData,
    IsClipboardFormatAvailable, OpenClipboard, SetClipboardData,
};
use windows::Win32::System::Memory::{GlobalAlloc, GlobalLock, GlobalSize, GlobalUnlock, GMEM_MOVEABLE};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
    KEYEVENTF_UNICODE, VIRTUAL_KEY, VK_BACK, VK_CONTROL, VK_RETURN, VK_TAB, VK_V,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowRect, GetWindowThreadProcessId,
};

/// The Win32 clipboard format for Unicode text.
const CF_UNICODETEXT: u32 = 13;

/// Stateless Win32 platform. All calls go straight to the OS.
#[derive(Debug, Default)]
pub struct Win32Platform;

impl Win32Platform {
    pub fn new() -> Self {
        Self
    }
}

fn virtual_key(code: KeyCode) -> VIRTUAL_KEY {
    match code {
        KeyCode::Enter => VK_RETURN,
        KeyCode::Tab => VK_TAB,
        KeyCode::Backspace => VK_BACK,
        KeyCode::Control => VK_CONTROL,
        KeyCode::KeyV => VK_V,
    }
}

/// Build an `INPUT` struct for a single virtual-key event.
fn key_input(vk: VIRTUAL_KEY, key_up: bool) -> INPUT {
    let flags = if key_up {
        KEYEVENTF_KEYUP
    } else {
        KEYBD_EVENT_FLAGS(0)
    };

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Build an `INPUT` struct for one UTF-16 code unit as a Unicode event.
fn unicode_input(unit: u16, key_up: bool) -> INPUT {
    let flags = if key_up {
        KEYEVENTF_UNICODE | KEYEVENTF_KEYUP
    } else {
        KEYEVENTF_UNICODE
    };

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: unit,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Expand the engine's event stream into the Win32 `INPUT` array. Unicode
/// scalars above the BMP become surrogate-pair down/up sequences.
fn expand_events(batch: &[InputEvent]) -> Vec<INPUT> {
    let mut inputs = Vec::with_capacity(batch.len() * 2);
    let mut units = [0u16; 2];
    for event in batch {
        match event {
            InputEvent::KeyDown(code) => inputs.push(key_input(virtual_key(*code), false)),
            InputEvent::KeyUp(code) => inputs.push(key_input(virtual_key(*code), true)),
            InputEvent::Unicode(c) => {
                for unit in c.encode_utf16(&mut units) {
                    inputs.push(unicode_input(*unit, false));
                    inputs.push(unicode_input(*unit, true));
                }
            }
        }
    }
    inputs
}

impl InputPlatform for Win32Platform {
    fn dispatch(&self, batch: &[InputEvent]) -> bool {
        if batch.is_empty() {
            return true;
        }
        let inputs = expand_events(batch);
        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent != inputs.len() as u32 {
            debug!("SendInput accepted {} of {} events", sent, inputs.len());
            return false;
        }
        true
    }

    fn foreground_window(&self) -> Option<RawWindow> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                return None;
            }

            let mut pid: u32 = 0;
            GetWindowThreadProcessId(hwnd, Some(&mut pid));
            if pid == 0 {
                return None;
            }

            let mut rect = RECT::default();
            let _ = GetWindowRect(hwnd, &mut rect);

            Some(RawWindow {
                handle: hwnd.0 as u64,
                process_id: pid,
                process_name: process_image_name(pid),
                rect: WindowRect {
                    left: rect.left,
                    top: rect.top,
                    right: rect.right,
                    bottom: rect.bottom,
                },
            })
        }
    }

    fn clipboard_text(&self) -> Result<Option<String>, ClipboardError> {
        unsafe {
            OpenClipboard(None).map_err(|_| ClipboardError::Unavailable)?;
            let result = read_clipboard_unicode();
            let _ = CloseClipboard();
            result
        }
    }

    fn set_clipboard_text(&self, text: &str) -> Result<(), ClipboardError> {
        unsafe {
            // Encode to UTF-16 with null terminator in moveable global memory;
            // the clipboard takes ownership of the allocation on success.
            let wide: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
            let byte_len = wide.len() * std::mem::size_of::<u16>();

            let hmem = GlobalAlloc(GMEM_MOVEABLE, byte_len)
                .map_err(|e| ClipboardError::Os(format!("GlobalAlloc failed: {e}")))?;

            let ptr = GlobalLock(hmem);
            if ptr.is_null() {
                return Err(ClipboardError::Os("GlobalLock returned null".into()));
            }
            std::ptr::copy_nonoverlapping(wide.as_ptr() as *const u8, ptr as *mut u8, byte_len);
            let _ = GlobalUnlock(hmem);

            OpenClipboard(None).map_err(|_| ClipboardError::Unavailable)?;
            if let Err(e) = EmptyClipboard() {
                let _ = CloseClipboard();
                return Err(ClipboardError::Os(format!("EmptyClipboard failed: {e}")));
            }
            let result = SetClipboardData(CF_UNICODETEXT, Some(HANDLE(hmem.0)));
            let _ = CloseClipboard();

            result.map_err(|e| ClipboardError::Os(format!("SetClipboardData failed: {e}")))?;
            Ok(())
        }
    }

    fn clear_clipboard(&self) -> Result<(), ClipboardError> {
        unsafe {
            OpenClipboard(None).map_err(|_| ClipboardError::Unavailable)?;
            let result = EmptyClipboard().map_err(|e| ClipboardError::Os(e.to_string()));
            let _ = CloseClipboard();
            result
        }
    }
}

/// Read CF_UNICODETEXT from an already-open clipboard.
unsafe fn read_clipboard_unicode() -> Result<Option<String>, ClipboardError> {
    if IsClipboardFormatAvailable(CF_UNICODETEXT).is_err() {
        // Distinguish an empty clipboard from one holding non-text content.
        if CountClipboardFormats() > 0 {
            return Err(ClipboardError::NonText);
        }
        return Ok(None);
    }

    let handle = GetClipboardData(CF_UNICODETEXT).map_err(|_| ClipboardError::Unavailable)?;
    let hmem = HGLOBAL(handle.0);
    let ptr = GlobalLock(hmem) as *const u16;
    if ptr.is_null() {
        return Err(ClipboardError::Os("GlobalLock returned null".into()));
    }

    let max_units = GlobalSize(hmem) / std::mem::size_of::<u16>();
    let mut len = 0usize;
    while len < max_units && *ptr.add(len) != 0 {
        len += 1;
    }
    let text = String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len));
    let _ = GlobalUnlock(hmem);
    Ok(Some(text))
}

/// Resolve the executable file name for a process id. Returns `None` when
/// the process exited between the window query and this lookup.
fn process_image_name(pid: u32) -> Option<String> {
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;

        let mut buf = vec![0u16; 1024];
        let mut len = buf.len() as u32;
        let ok = QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_WIN32,
            PWSTR(buf.as_mut_ptr()),
            &mut len,
        );
        let _ = CloseHandle(handle);

        if ok.is_err() || len == 0 {
            return None;
        }

        let path = OsString::from_wide(&buf[..len as usize]);
        let path = path.to_string_lossy();
        path.rsplit('\\').next().map(|name| name.to_string())
    }
}
