//! # Compatibility-Aware Injector
//!
//! Key-event synthesis with per-character pacing driven by the target's
//! compatibility profile. Real applications have divergent internal
//! key-event processing latencies: a fixed delay is either too slow for
//! plain editors or drops characters in rich-text/IDE surfaces. The pacing
//! policy is per-category and table-driven, not per-application-instance,
//! to keep the rule set finite and testable.

use crate::classifier::{tags, ApplicationCompatibility};
use crate::error::{InjectionError, InjectionResult};
use crate::platform::{InputEvent, InputPlatform};
use crate::synthesizer::events_for_char;
use crate::types::{InjectionContext, InjectionMethod};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Characters that commonly trigger auto-complete or bracket matching.
const SYNTAX_CHARS: [char; 8] = ['{', '}', '[', ']', '(', ')', '<', '>'];

/// Fixed settle delay for tab under the `tab` tag: tab triggers fast
/// focus-navigation in many editors, so it needs less time than text.
const TAB_SETTLE: Duration = Duration::from_millis(30);
/// Fixed settle delay for newline under the `newline` tag.
const NEWLINE_SETTLE: Duration = Duration::from_millis(50);

/// Pacing delay for one character under a profile. Rules, most specific
/// first:
/// - `office_app` setting: 2x base for every character, reflecting Office's
///   internal text-processing overhead (encoding also switches to
///   Unicode-only events, see [`unicode_only_events`])
/// - `tab` tag + tab: fixed 30ms
/// - `newline` tag + newline: fixed 50ms
/// - `syntax_chars` tag + bracket character: 4x base
/// - `unicode` tag: 2x base
/// - otherwise: base delay
pub(crate) fn char_delay(c: char, profile: &ApplicationCompatibility, base: Duration) -> Duration {
    if profile.setting("office_app").is_some() {
        return base * 2;
    }
    if c == '\t' && profile.has_tag(tags::TAB) {
        return TAB_SETTLE;
    }
    if c == '\n' && profile.has_tag(tags::NEWLINE) {
        return NEWLINE_SETTLE;
    }
    if SYNTAX_CHARS.contains(&c) && profile.has_tag(tags::SYNTAX_CHARS) {
        return base * 4;
    }
    if profile.has_tag(tags::UNICODE) {
        return base * 2;
    }
    base
}

/// Office targets get every character as a Unicode code-point event, even
/// newline and tab; the rich-text layer drops or garbles rapid virtual-key
/// control pairs. Carriage returns are still swallowed so `\r\n` stays one
/// newline.
pub(crate) fn unicode_only_events(c: char, out: &mut Vec<InputEvent>) {
    if c != '\r' {
        out.push(InputEvent::Unicode(c));
    }
}

/// Last-resort injector for known-difficult categories. Builds one
/// aggregated event batch exactly like the plain synthesizer, but with
/// per-character pacing decisions driven by the profile.
pub struct CompatibilityAwareInjector {
    platform: Arc<dyn InputPlatform>,
}

impl CompatibilityAwareInjector {
    pub fn new(platform: Arc<dyn InputPlatform>) -> Self {
        Self { platform }
    }

    /// Construct and dispatch the paced event batch. Pacing throttles
    /// construction (a suspension point per character); the batch is still
    /// submitted in a single ordered OS call.
    pub async fn inject_with_profile(
        &self,
        text: &str,
        profile: &ApplicationCompatibility,
        base_delay: Duration,
    ) -> InjectionResult<()> {
        if text.is_empty() {
            return Ok(());
        }

        let office = profile.setting("office_app").is_some();
        let mut batch = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            if office {
                unicode_only_events(c, &mut batch);
            } else {
                events_for_char(c, &mut batch);
            }
            let delay = char_delay(c, profile, base_delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        trace!(
            events = batch.len(),
            category = %profile.category,
            "dispatching compatibility-paced batch"
        );
        if self.platform.dispatch(&batch) {
            Ok(())
        } else {
            debug!("OS rejected compatibility-paced input batch");
            Err(InjectionError::MethodFailed {
                method: InjectionMethod::CompatibilityAware,
                reason: "input batch rejected by OS".to_string(),
            })
        }
    }
}

#[async_trait]
impl crate::MethodInjector for CompatibilityAwareInjector {
    fn method(&self) -> InjectionMethod {
        InjectionMethod::CompatibilityAware
    }

    async fn inject(&self, text: &str, cx: &InjectionContext) -> InjectionResult<()> {
        self.inject_with_profile(text, &cx.profile, cx.options.char_delay())
            .await
    }
}
