//! # Metrics & Diagnostics Recorder
//!
//! Rolling window of injection attempts plus derived metrics and a
//! human-readable issues report. Kept lightweight: derived values are
//! computed on demand from the bounded history, never stored.

use crate::probe::WindowInfo;
use crate::types::InjectionMethod;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use unicode_segmentation::UnicodeSegmentation;

/// Hard cap on retained attempts; oldest entries are evicted on overflow.
pub const ATTEMPT_HISTORY_CAP: usize = 100;

/// Telemetry excerpts keep at most this many graphemes of the injected text.
const EXCERPT_MAX_GRAPHEMES: usize = 32;

/// Telemetry record for one physical method invocation. Never mutated after
/// creation; garbage-collected by eviction from the rolling history.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionAttempt {
    pub timestamp: DateTime<Utc>,
    /// Bounded excerpt of the injected text, not the full content.
    pub excerpt: String,
    pub success: bool,
    pub method: InjectionMethod,
    pub duration_ms: u64,
    pub window: WindowInfo,
}

impl InjectionAttempt {
    /// Truncate text to a bounded excerpt at a grapheme boundary.
    pub fn excerpt_of(text: &str) -> String {
        let mut excerpt: String = text.graphemes(true).take(EXCERPT_MAX_GRAPHEMES).collect();
        if excerpt.len() < text.len() {
            excerpt.push('…');
        }
        excerpt
    }
}

/// Derived metrics for a trailing time window. Computed on demand.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionMetrics {
    pub total_attempts: usize,
    pub successes: usize,
    pub failures: usize,
    /// 1.0 when the window holds no attempts.
    pub success_rate: f64,
    /// Mean latency of successful attempts only; failed attempts do not
    /// skew it. Zero when there are no successes.
    pub average_latency_ms: f64,
    /// Up to 5 most recent failures in the window.
    pub recent_failures: Vec<InjectionAttempt>,
}

/// Overall health classification derived from the windowed success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InjectionHealth {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl std::fmt::Display for InjectionHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            InjectionHealth::Excellent => "Excellent",
            InjectionHealth::Good => "Good",
            InjectionHealth::Fair => "Fair",
            InjectionHealth::Poor => "Poor",
            InjectionHealth::Critical => "Critical",
        };
        write!(f, "{label}")
    }
}

impl InjectionHealth {
    /// Fixed success-rate thresholds.
    fn from_success_rate(rate: f64) -> Self {
        if rate >= 0.9 {
            InjectionHealth::Excellent
        } else if rate >= 0.8 {
            InjectionHealth::Good
        } else if rate >= 0.6 {
            InjectionHealth::Fair
        } else if rate >= 0.4 {
            InjectionHealth::Poor
        } else {
            InjectionHealth::Critical
        }
    }
}

/// Human-readable diagnostics: health label plus textual recommendations.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionIssuesReport {
    pub health: InjectionHealth,
    pub metrics: InjectionMetrics,
    pub recommendations: Vec<String>,
}

/// Bounded rolling history of injection attempts, owned exclusively by one
/// orchestrator instance.
#[derive(Debug, Default)]
pub struct AttemptHistory {
    entries: VecDeque<InjectionAttempt>,
}

impl AttemptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attempt, evicting the oldest entry beyond the cap.
    pub fn record(&mut self, attempt: InjectionAttempt) {
        self.entries.push_back(attempt);
        while self.entries.len() > ATTEMPT_HISTORY_CAP {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InjectionAttempt> {
        self.entries.iter()
    }

    fn windowed(&self, window_minutes: i64) -> impl Iterator<Item = &InjectionAttempt> {
        let cutoff = Utc::now() - ChronoDuration::minutes(window_minutes);
        self.entries.iter().filter(move |a| a.timestamp >= cutoff)
    }

    /// Compute metrics over the trailing window. Attempts older than the
    /// window never contribute, independent of the hard history cap.
    pub fn metrics(&self, window_minutes: i64) -> InjectionMetrics {
        let mut total = 0usize;
        let mut successes = 0usize;
        let mut latency_sum = 0u64;
        let mut failures: Vec<&InjectionAttempt> = Vec::new();

        for attempt in self.windowed(window_minutes) {
            total += 1;
            if attempt.success {
                successes += 1;
                latency_sum += attempt.duration_ms;
            } else {
                failures.push(attempt);
            }
        }

        let success_rate = if total == 0 {
            1.0
        } else {
            successes as f64 / total as f64
        };
        let average_latency_ms = if successes == 0 {
            0.0
        } else {
            latency_sum as f64 / successes as f64
        };

        // Keep the 5 most recent failures.
        let skip = failures.len().saturating_sub(5);
        let recent_failures = failures.into_iter().skip(skip).cloned().collect();

        InjectionMetrics {
            total_attempts: total,
            successes,
            failures: total - successes,
            success_rate,
            average_latency_ms,
            recent_failures,
        }
    }

    /// Classify health and emit recommendations over the trailing window.
    pub fn issues_report(&self, window_minutes: i64) -> InjectionIssuesReport {
        let metrics = self.metrics(window_minutes);
        let health = InjectionHealth::from_success_rate(metrics.success_rate);
        let mut recommendations = Vec::new();

        if metrics.total_attempts > 0 && metrics.success_rate < 0.5 {
            recommendations.push(
                "Success rate is low; enable clipboard fallback for difficult targets".to_string(),
            );
        }
        if metrics.average_latency_ms > 50.0 {
            recommendations.push(
                "Average latency exceeds 50ms; reduce the per-character delay or investigate system load"
                    .to_string(),
            );
        }

        // Failures clustering on one target process suggest an
        // application-specific problem rather than a systemic one.
        let mut failures_by_process: HashMap<&str, usize> = HashMap::new();
        for attempt in self.windowed(window_minutes).filter(|a| !a.success) {
            *failures_by_process
                .entry(attempt.window.process_name.as_str())
                .or_default() += 1;
        }
        let mut clustered: Vec<(&str, usize)> = failures_by_process
            .into_iter()
            .filter(|(name, count)| *count >= 2 && !name.is_empty())
            .collect();
        clustered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        for (process, count) in clustered {
            recommendations.push(format!(
                "{count} failures against '{process}'; consider an application-specific profile or method override"
            ));
        }

        InjectionIssuesReport {
            health,
            metrics,
            recommendations,
        }
    }
}
