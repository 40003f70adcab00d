//! # Core Data Types for Text Injection
//!
//! Configuration and method identification shared across the crate. The main
//! error and telemetry types live in `error.rs` and `metrics.rs`.

use crate::classifier::ApplicationCompatibility;
use crate::probe::WindowInfo;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Enumeration of the available text injection delivery strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InjectionMethod {
    /// Direct key-event synthesis: one batched stream of key and Unicode
    /// code-point events submitted in a single OS call.
    SendInput,
    /// Clipboard-paste simulation: set clipboard, synthesize the paste
    /// shortcut, restore the prior clipboard contents.
    ClipboardFallback,
    /// Key-event synthesis with per-character pacing driven by the target's
    /// compatibility profile. Most expensive, most correct for known-difficult
    /// application categories.
    CompatibilityAware,
}

impl std::fmt::Display for InjectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InjectionMethod::SendInput => write!(f, "SendInput"),
            InjectionMethod::ClipboardFallback => write!(f, "ClipboardFallback"),
            InjectionMethod::CompatibilityAware => write!(f, "CompatibilityAware"),
        }
    }
}

/// Per-call configuration for `inject_text`. Immutable for the duration of
/// one call; all fields have documented defaults so callers can pass `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectionOptions {
    /// Whether to escalate to the clipboard method even when the preferred
    /// method is key synthesis and it succeeded on a prior attempt.
    #[serde(default = "default_false")]
    pub use_clipboard_fallback: bool,

    /// Number of additional retry rounds after the first (0 means a single
    /// pass through the method chain).
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Pause between retry rounds, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub delay_between_retries_ms: u64,

    /// Base pacing delay inserted after each character's events are queued,
    /// in milliseconds.
    #[serde(default = "default_char_delay_ms")]
    pub delay_between_chars_ms: u64,

    /// Advisory flag: do not disturb text already present in the target.
    /// Accepted and logged, but no method currently acts on it.
    #[serde(default = "default_true")]
    pub respect_existing_text: bool,
}

fn default_false() -> bool {
    false
}

fn default_true() -> bool {
    true
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_char_delay_ms() -> u64 {
    5
}

impl Default for InjectionOptions {
    fn default() -> Self {
        Self {
            use_clipboard_fallback: default_false(),
            retry_count: default_retry_count(),
            delay_between_retries_ms: default_retry_delay_ms(),
            delay_between_chars_ms: default_char_delay_ms(),
            respect_existing_text: default_true(),
        }
    }
}

impl InjectionOptions {
    /// Base per-character pacing delay as a `Duration`.
    pub fn char_delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_chars_ms)
    }

    /// Pause between retry rounds as a `Duration`.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_retries_ms)
    }
}

/// Context handed to each method injector for a single physical attempt.
#[derive(Debug, Clone)]
pub struct InjectionContext {
    pub options: InjectionOptions,
    pub profile: ApplicationCompatibility,
}

/// Diagnostic value returned by `test_injection`. Transient, created per
/// test invocation.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionTestResult {
    pub success: bool,
    pub test_text: String,
    pub method_used: Option<InjectionMethod>,
    pub issues: Vec<String>,
    pub duration_ms: u64,
    pub window: WindowInfo,
    pub compatibility: ApplicationCompatibility,
}
