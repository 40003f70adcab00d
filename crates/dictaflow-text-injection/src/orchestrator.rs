//! # Injection Orchestrator
//!
//! The public entry point of the engine. Sequences classification,
//! compatibility checking, method selection, the bounded retry loop, and
//! telemetry recording. The ordered fallback (key synthesis, then
//! clipboard paste, then compatibility pacing) reflects empirical
//! reliability ranking across target applications.

use crate::classifier::{ApplicationCompatibility, CompatibilityTable};
use crate::clipboard::ClipboardInjector;
use crate::compat_injector::CompatibilityAwareInjector;
use crate::error::{InjectionError, InjectionResult};
use crate::metrics::{AttemptHistory, InjectionAttempt, InjectionIssuesReport, InjectionMetrics};
use crate::platform::InputPlatform;
use crate::probe::{WindowInfo, WindowProber};
use crate::settings::SettingsProvider;
use crate::synthesizer::InputSynthesizer;
use crate::types::{InjectionContext, InjectionMethod, InjectionOptions, InjectionTestResult};
use crate::MethodInjector;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, error, info, trace, warn};

/// Metrics window for `performance_metrics`, in minutes.
const METRICS_WINDOW_MINUTES: i64 = 5;
/// Window for the issues report, in minutes.
const ISSUES_WINDOW_MINUTES: i64 = 10;

/// Redact text content for privacy-first logging.
fn redact_text(text: &str, redact: bool) -> String {
    if redact {
        // A fast, stable std hasher avoids logging raw dictated text.
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let hash = hasher.finish();
        format!("len={} hash={:08x}", text.len(), (hash & 0xFFFFFFFF))
    } else {
        text.to_string()
    }
}

struct OrchestratorState {
    initialized: bool,
    disposed: bool,
    debug_mode: bool,
    default_options: InjectionOptions,
    history: AttemptHistory,
    settings_task: Option<tokio::task::JoinHandle<()>>,
}

/// Orchestrates text injection into the foreground application.
///
/// One instance exclusively owns its attempt history; callers are expected
/// to serialize their own `inject_text` calls (concurrent keystroke streams
/// into one foreground window interleave unpredictably at the OS level
/// regardless of engine-side locking).
pub struct InjectionOrchestrator {
    prober: WindowProber,
    table: CompatibilityTable,
    synthesizer: InputSynthesizer,
    clipboard: ClipboardInjector,
    compat: CompatibilityAwareInjector,
    state: Arc<Mutex<OrchestratorState>>,
}

impl InjectionOrchestrator {
    /// Build an orchestrator over a platform and an explicitly constructed
    /// compatibility table. The table is injected as an immutable value so
    /// tests can substitute custom profiles.
    pub fn new(platform: Arc<dyn InputPlatform>, table: CompatibilityTable) -> Self {
        Self {
            prober: WindowProber::new(platform.clone()),
            table,
            synthesizer: InputSynthesizer::new(platform.clone()),
            clipboard: ClipboardInjector::new(platform.clone()),
            compat: CompatibilityAwareInjector::new(platform),
            state: Arc::new(Mutex::new(OrchestratorState {
                initialized: false,
                disposed: false,
                debug_mode: false,
                default_options: InjectionOptions::default(),
                history: AttemptHistory::new(),
                settings_task: None,
            })),
        }
    }

    /// One-time setup. Idempotent: a second call short-circuits to `true`
    /// without side effects. Returns `false` after disposal.
    pub fn initialize(&self) -> bool {
        let mut state = self.state.lock();
        if state.disposed {
            return false;
        }
        if !state.initialized {
            state.initialized = true;
            info!("text injection service initialized");
        }
        true
    }

    /// Inject `text` into the current foreground application.
    ///
    /// Empty text is an immediate no-op success. Calling before
    /// `initialize()` or after `dispose()` is a hard failure; every other
    /// failure mode degrades to a structured error plus diagnostic data.
    pub async fn inject_text(
        &self,
        text: &str,
        options: Option<InjectionOptions>,
    ) -> InjectionResult<()> {
        let (options, debug_mode) = {
            let state = self.state.lock();
            if state.disposed {
                return Err(InjectionError::Disposed);
            }
            if !state.initialized {
                return Err(InjectionError::NotInitialized);
            }
            (
                options.unwrap_or_else(|| state.default_options.clone()),
                state.debug_mode,
            )
        };

        if text.is_empty() {
            return Ok(());
        }

        debug!(
            "injection requested for text: {}",
            redact_text(text, !debug_mode)
        );
        if options.respect_existing_text {
            trace!("respect_existing_text is advisory; no method acts on it");
        }

        // Classify once per call; everything downstream receives the
        // resolved profile value, never a second table lookup.
        let window = self.prober.probe();
        let profile = self.table.classify(&window);
        if !profile.is_compatible {
            debug!(
                process = %window.process_name,
                "target classified incompatible; no attempt recorded"
            );
            return Err(InjectionError::IncompatibleTarget {
                app: window.process_name,
            });
        }
        if !WindowProber::is_injectable(&window) {
            return Err(InjectionError::NoTarget);
        }

        let cx = InjectionContext {
            options: options.clone(),
            profile: profile.clone(),
        };
        let total_start = Instant::now();
        let mut physical_attempts = 0u32;

        for round in 0..=options.retry_count {
            for injector in self.method_chain(&profile) {
                physical_attempts += 1;
                let method = injector.method();
                let started = Instant::now();
                let result = injector.inject(text, &cx).await;
                let duration_ms = started.elapsed().as_millis() as u64;

                self.record_attempt(text, result.is_ok(), method, duration_ms, &window);

                match result {
                    Ok(()) => {
                        info!(
                            "injected {} chars using {} ({}ms, attempt {}, total {}ms)",
                            text.len(),
                            method,
                            duration_ms,
                            physical_attempts,
                            total_start.elapsed().as_millis()
                        );
                        if debug_mode {
                            trace!("full text injected: {text}");
                        }
                        return Ok(());
                    }
                    Err(e) => {
                        debug!(
                            "method {} failed after {}ms (attempt {}): {}",
                            method, duration_ms, physical_attempts, e
                        );
                    }
                }
            }

            if round < options.retry_count {
                trace!("retry round {} exhausted, pausing before next", round + 1);
                tokio::time::sleep(options.retry_delay()).await;
            }
        }

        error!(
            "all injection methods failed for '{}' after {} attempts ({}ms)",
            window.process_name,
            physical_attempts,
            total_start.elapsed().as_millis()
        );
        Err(InjectionError::AllMethodsFailed {
            attempts: physical_attempts,
        })
    }

    /// Ordered method chain for one retry round. Key synthesis leads when
    /// the profile prefers it; clipboard paste follows as the escalation
    /// path; compatibility pacing is the last resort for profiles that
    /// carry special-handling tags.
    fn method_chain(&self, profile: &ApplicationCompatibility) -> Vec<&dyn MethodInjector> {
        let mut chain: Vec<&dyn MethodInjector> = Vec::new();
        if profile.preferred_method == InjectionMethod::SendInput {
            chain.push(&self.synthesizer);
        }
        chain.push(&self.clipboard);
        if !profile.requires_special_handling.is_empty() {
            chain.push(&self.compat);
        }
        chain
    }

    fn record_attempt(
        &self,
        text: &str,
        success: bool,
        method: InjectionMethod,
        duration_ms: u64,
        window: &WindowInfo,
    ) {
        let attempt = InjectionAttempt {
            timestamp: Utc::now(),
            excerpt: InjectionAttempt::excerpt_of(text),
            success,
            method,
            duration_ms,
            window: window.clone(),
        };
        self.state.lock().history.record(attempt);
    }

    /// Send a short timestamp-tagged diagnostic string with clipboard
    /// fallback enabled, returning full diagnostic context.
    pub async fn test_injection(&self) -> InjectionResult<InjectionTestResult> {
        let window = self.prober.probe();
        let compatibility = self.table.classify(&window);
        let test_text = format!("dictaflow test {}", Utc::now().format("%H:%M:%S%.3f"));
        let options = InjectionOptions {
            use_clipboard_fallback: true,
            ..InjectionOptions::default()
        };

        let started = Instant::now();
        let mut issues = Vec::new();
        let mut method_used = None;

        let success = match self.inject_text(&test_text, Some(options)).await {
            Ok(()) => {
                method_used = self.last_attempt_method();
                true
            }
            Err(e @ InjectionError::NotInitialized) | Err(e @ InjectionError::Disposed) => {
                return Err(e);
            }
            Err(e) => {
                issues.push(e.to_string());
                false
            }
        };

        Ok(InjectionTestResult {
            success,
            test_text,
            method_used,
            issues,
            duration_ms: started.elapsed().as_millis() as u64,
            window,
            compatibility,
        })
    }

    fn last_attempt_method(&self) -> Option<InjectionMethod> {
        let state = self.state.lock();
        state.history.iter().last().map(|a| a.method)
    }

    /// Current classification without performing injection.
    pub fn application_compatibility(&self) -> ApplicationCompatibility {
        let window = self.prober.probe();
        self.table.classify(&window)
    }

    /// Raw probe result for the current foreground window.
    pub fn current_window_info(&self) -> WindowInfo {
        self.prober.probe()
    }

    /// Quick compatibility check without a full classification.
    pub fn is_injection_compatible(&self) -> bool {
        self.prober.has_injectable_target()
    }

    /// Derived metrics over the trailing 5-minute window.
    pub fn performance_metrics(&self) -> InjectionMetrics {
        self.state.lock().history.metrics(METRICS_WINDOW_MINUTES)
    }

    /// Health classification and recommendations over the trailing
    /// 10-minute window.
    pub fn injection_issues_report(&self) -> InjectionIssuesReport {
        self.state
            .lock()
            .history
            .issues_report(ISSUES_WINDOW_MINUTES)
    }

    /// Number of attempts currently retained in the rolling history.
    pub fn attempt_history_len(&self) -> usize {
        self.state.lock().history.len()
    }

    /// Toggle verbose diagnostic tracing. No behavioral change to
    /// injection itself.
    pub fn set_debug_mode(&self, enabled: bool) {
        self.state.lock().debug_mode = enabled;
        debug!("debug mode {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Subscribe to a host settings provider; on a relevant change the
    /// engine re-reads its default injection options. Replaces any prior
    /// subscription.
    pub fn attach_settings_provider(&self, provider: Arc<dyn SettingsProvider>) {
        let mut rx = provider.subscribe();
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) if change.affects_injection() => {
                        let options = provider.injection_options();
                        debug!(category = %change.category, "reloading injection options");
                        state.lock().default_options = options;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("settings listener lagged, skipped {skipped} notifications");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut state = self.state.lock();
        if let Some(previous) = state.settings_task.replace(handle) {
            previous.abort();
        }
    }

    /// Release held resources (the settings subscription, if attached).
    /// Safe to call multiple times; subsequent API use fails with
    /// `Disposed`.
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        if let Some(task) = state.settings_task.take() {
            task.abort();
        }
        if !state.disposed {
            state.disposed = true;
            info!("text injection service disposed");
        }
    }

    /// Default options currently in effect for calls that pass `None`.
    pub fn default_options(&self) -> InjectionOptions {
        self.state.lock().default_options.clone()
    }
}
