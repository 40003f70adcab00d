//! # Clipboard Injector
//!
//! Alternate delivery path: store the text on the system clipboard,
//! synthesize the paste shortcut, then restore whatever was there before.
//! The clipboard is an externally shared resource, so restoration is
//! attempted on a best-effort basis even when the paste itself fails.

use crate::error::{ClipboardError, InjectionError, InjectionResult};
use crate::platform::{InputEvent, InputPlatform, KeyCode};
use crate::types::{InjectionContext, InjectionMethod};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Settle time after setting the clipboard, before the paste chord.
const SETTLE_BEFORE_PASTE: Duration = Duration::from_millis(120);
/// Settle time after the paste chord, for the target to consume the paste.
const SETTLE_AFTER_PASTE: Duration = Duration::from_millis(150);

/// The paste shortcut as discrete modifier events: modifiers down, key down,
/// key up, modifiers up.
fn paste_chord() -> [InputEvent; 4] {
    [
        InputEvent::KeyDown(KeyCode::Control),
        InputEvent::KeyDown(KeyCode::KeyV),
        InputEvent::KeyUp(KeyCode::KeyV),
        InputEvent::KeyUp(KeyCode::Control),
    ]
}

/// What the clipboard held before the paste. `Unreadable` is kept distinct
/// from `Empty`: an unreadable snapshot means the prior content is
/// unrecoverable, not absent.
enum Snapshot {
    Text(String),
    Empty,
    NonText,
    Unreadable,
}

/// Clipboard-paste injector. More robust than raw key synthesis, at the
/// cost of briefly altering clipboard state.
pub struct ClipboardInjector {
    platform: Arc<dyn InputPlatform>,
}

impl ClipboardInjector {
    pub fn new(platform: Arc<dyn InputPlatform>) -> Self {
        Self { platform }
    }

    /// Full save / set / paste / restore cycle. The pre-call clipboard text
    /// is put back afterwards; non-text prior content is cleared rather
    /// than corrupted. Restoration only runs once our own set has taken
    /// effect: a failed set leaves the clipboard exactly as it was.
    pub async fn inject_via_clipboard(&self, text: &str) -> InjectionResult<()> {
        if text.is_empty() {
            return Ok(());
        }

        let saved = match self.platform.clipboard_text() {
            Ok(Some(prev)) => Snapshot::Text(prev),
            Ok(None) => Snapshot::Empty,
            Err(ClipboardError::NonText) => {
                debug!("prior clipboard content is not text; will clear on restore");
                Snapshot::NonText
            }
            Err(e) => {
                debug!("could not snapshot clipboard: {e}");
                Snapshot::Unreadable
            }
        };

        // Until this set succeeds the clipboard is untouched, so an early
        // return here preserves whatever the user had.
        self.platform.set_clipboard_text(text)?;

        let result = self.dispatch_paste().await;

        // Best-effort restore regardless of the paste outcome, so user
        // clipboard state is not silently clobbered.
        let restore = match &saved {
            Snapshot::Text(prev) => self.platform.set_clipboard_text(prev),
            Snapshot::Empty | Snapshot::NonText => self.platform.clear_clipboard(),
            Snapshot::Unreadable => {
                // The prior content could not be read and is now gone;
                // clear so the dictated text at least does not linger.
                warn!("clipboard snapshot failed before paste; prior contents could not be restored");
                self.platform.clear_clipboard()
            }
        };
        if let Err(e) = restore {
            warn!("failed to restore clipboard: {e}");
        }

        result
    }

    async fn dispatch_paste(&self) -> InjectionResult<()> {
        tokio::time::sleep(SETTLE_BEFORE_PASTE).await;

        if !self.platform.dispatch(&paste_chord()) {
            debug!("OS rejected paste key sequence");
            return Err(InjectionError::MethodFailed {
                method: InjectionMethod::ClipboardFallback,
                reason: "paste key sequence rejected by OS".to_string(),
            });
        }

        tokio::time::sleep(SETTLE_AFTER_PASTE).await;
        Ok(())
    }
}

#[async_trait]
impl crate::MethodInjector for ClipboardInjector {
    fn method(&self) -> InjectionMethod {
        InjectionMethod::ClipboardFallback
    }

    async fn inject(&self, text: &str, _cx: &InjectionContext) -> InjectionResult<()> {
        self.inject_via_clipboard(text).await
    }
}
