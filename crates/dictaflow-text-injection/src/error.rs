//! # Error types for the text injection crate.
//!
//! All expected failure modes are expressed as structured error values so the
//! orchestrator can degrade to diagnostics instead of crashing the host's
//! dictation path. Only calling the API before `initialize()` (or after
//! `dispose()`) is a hard failure the caller must handle.

use crate::types::InjectionMethod;
use serde::Serialize;
use thiserror::Error;

/// The primary error type for text injection operations.
#[derive(Debug, Error, Serialize)]
pub enum InjectionError {
    /// `inject_text` was called before `initialize()`.
    #[error("injection service has not been initialized")]
    NotInitialized,

    /// The orchestrator was disposed and can no longer be used.
    #[error("injection service has been disposed")]
    Disposed,

    /// The foreground application is classified as not compatible with
    /// injection. Recoverable only by the user switching focus; never
    /// retried internally.
    #[error("target application '{app}' is not compatible with text injection")]
    IncompatibleTarget { app: String },

    /// No injectable foreground target exists (no window, or a denied
    /// OS/shell process such as the lock screen holds focus).
    #[error("no injectable foreground target")]
    NoTarget,

    /// A single physical injection method failed. Triggers fallback-method
    /// escalation within the same call.
    #[error("injection method {method} failed: {reason}")]
    MethodFailed {
        method: InjectionMethod,
        reason: String,
    },

    /// Every method failed across every retry round. The attempt history
    /// retains each physical failure for later diagnosis.
    #[error("all injection methods failed after {attempts} attempts")]
    AllMethodsFailed { attempts: u32 },

    /// Clipboard access was denied or failed transiently. Treated as a
    /// method failure for the attempt; restoration is still attempted.
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Errors that can occur during clipboard operations.
#[derive(Debug, Error, Serialize, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The clipboard is locked by another process or access was denied.
    #[error("clipboard is locked or access was denied")]
    Unavailable,

    /// The clipboard holds non-text content we cannot snapshot.
    #[error("clipboard content is not text")]
    NonText,

    /// The underlying OS clipboard call failed.
    #[error("clipboard operation failed: {0}")]
    Os(String),
}

/// Convenience alias used across the crate.
pub type InjectionResult<T> = Result<T, InjectionError>;
