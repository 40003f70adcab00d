//! # Dictaflow Text Injection Library
//!
//! Cross-application text injection engine for the Dictaflow dictation app.
//! It types arbitrary Unicode text into whatever uncontrolled foreign
//! application currently holds keyboard focus, using OS-level input
//! simulation with deterministic fallback between delivery strategies.
//!
//! ## Delivery strategies
//!
//! | Method             | Mechanism                          | Trade-off                       |
//! |--------------------|------------------------------------|---------------------------------|
//! | SendInput          | Batched key/Unicode event synthesis| Fastest, fragile in rich text   |
//! | ClipboardFallback  | Clipboard swap + paste shortcut    | Robust, touches clipboard state |
//! | CompatibilityAware | Key synthesis with per-char pacing | Slowest, safest for IDEs/Office |
//!
//! The foreground application is classified into a compatibility profile
//! (browser, IDE, Office, chat, plain editor, terminal) that picks the
//! preferred method and special-handling tags; the orchestrator escalates
//! through the remaining methods with a bounded retry loop and records
//! attempt-level telemetry for diagnostics.
//!
//! The engine is OS-agnostic above the [`platform::InputPlatform`] seam;
//! the Win32 implementation (SendInput, Win32 clipboard, foreground-window
//! queries) is compiled in on Windows.

pub mod classifier;
pub mod clipboard;
pub mod compat_injector;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod platform;
pub mod probe;
pub mod processor;
pub mod settings;
pub mod synthesizer;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

// Re-export key components for easy access
pub use classifier::{ApplicationCategory, ApplicationCompatibility, CompatibilityTable};
pub use error::{ClipboardError, InjectionError, InjectionResult};
pub use metrics::{
    InjectionAttempt, InjectionHealth, InjectionIssuesReport, InjectionMetrics,
    ATTEMPT_HISTORY_CAP,
};
pub use orchestrator::InjectionOrchestrator;
pub use platform::{native_platform, InputPlatform};
pub use probe::{WindowInfo, WindowProber};
pub use processor::{AsyncInjectionProcessor, DictatedChunk};
pub use settings::{SettingsChange, SettingsProvider};
pub use types::{InjectionMethod, InjectionOptions, InjectionTestResult};

/// Trait implemented by each physical delivery strategy. The orchestrator
/// dispatches through this seam so the fallback chain stays data-driven.
#[async_trait::async_trait]
pub trait MethodInjector: Send + Sync {
    /// Which delivery strategy this injector implements.
    fn method(&self) -> InjectionMethod;

    /// Perform one physical injection attempt.
    async fn inject(
        &self,
        text: &str,
        cx: &types::InjectionContext,
    ) -> InjectionResult<()>;
}
