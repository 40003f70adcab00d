//! # Input Synthesizer
//!
//! Low-level primitive that converts a character stream into OS input events
//! and dispatches them as one batched call. Control characters become
//! key-down/up pairs; everything else becomes a Unicode code-point event so
//! characters with no keyboard-layout mapping still work.

use crate::error::{InjectionError, InjectionResult};
use crate::platform::{InputEvent, InputPlatform, KeyCode};
use crate::types::{InjectionContext, InjectionMethod};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Translate one character into its input events. Carriage returns are
/// swallowed so `\r\n` sequences produce a single Enter.
pub(crate) fn events_for_char(c: char, out: &mut Vec<InputEvent>) {
    match c {
        '\n' => {
            out.push(InputEvent::KeyDown(KeyCode::Enter));
            out.push(InputEvent::KeyUp(KeyCode::Enter));
        }
        '\r' => {}
        '\t' => {
            out.push(InputEvent::KeyDown(KeyCode::Tab));
            out.push(InputEvent::KeyUp(KeyCode::Tab));
        }
        '\u{8}' => {
            out.push(InputEvent::KeyDown(KeyCode::Backspace));
            out.push(InputEvent::KeyUp(KeyCode::Backspace));
        }
        _ => out.push(InputEvent::Unicode(c)),
    }
}

/// Direct key-event synthesis. Fastest method, most fragile against
/// rich-text surfaces.
pub struct InputSynthesizer {
    platform: Arc<dyn InputPlatform>,
}

impl InputSynthesizer {
    pub fn new(platform: Arc<dyn InputPlatform>) -> Self {
        Self { platform }
    }

    /// Build and dispatch the event batch for `text`. The per-character
    /// delay throttles event construction (a cooperative suspension point
    /// after each character is queued); the whole batch is still submitted
    /// in one OS call at the end so character order is preserved.
    pub async fn synthesize(&self, text: &str, per_char_delay: Duration) -> InjectionResult<()> {
        if text.is_empty() {
            return Ok(());
        }

        let mut batch = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            events_for_char(c, &mut batch);
            if !per_char_delay.is_zero() {
                tokio::time::sleep(per_char_delay).await;
            }
        }

        trace!(events = batch.len(), "dispatching synthesized batch");
        if self.platform.dispatch(&batch) {
            Ok(())
        } else {
            debug!("OS rejected synthesized input batch");
            Err(InjectionError::MethodFailed {
                method: InjectionMethod::SendInput,
                reason: "input batch rejected by OS".to_string(),
            })
        }
    }
}

#[async_trait]
impl crate::MethodInjector for InputSynthesizer {
    fn method(&self) -> InjectionMethod {
        InjectionMethod::SendInput
    }

    async fn inject(&self, text: &str, cx: &InjectionContext) -> InjectionResult<()> {
        self.synthesize(text, cx.options.char_delay()).await
    }
}
