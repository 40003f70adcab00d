//! # Application Classifier
//!
//! Maps the foreground process name to an application category and a fixed
//! compatibility profile. The whole mapping is data: an ordered rule table
//! plus a per-category profile table, constructed once and injected as an
//! immutable value, so new applications can be added without touching
//! dispatch logic and tests can substitute custom tables.

use crate::probe::{self, WindowInfo};
use crate::types::InjectionMethod;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Closed set of application categories the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApplicationCategory {
    Browser,
    DevelopmentTool,
    Office,
    Communication,
    TextEditor,
    Terminal,
    Unknown,
}

impl std::fmt::Display for ApplicationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ApplicationCategory::Browser => "Browser",
            ApplicationCategory::DevelopmentTool => "DevelopmentTool",
            ApplicationCategory::Office => "Office",
            ApplicationCategory::Communication => "Communication",
            ApplicationCategory::TextEditor => "TextEditor",
            ApplicationCategory::Terminal => "Terminal",
            ApplicationCategory::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

impl ApplicationCategory {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "Browser" => Ok(ApplicationCategory::Browser),
            "DevelopmentTool" => Ok(ApplicationCategory::DevelopmentTool),
            "Office" => Ok(ApplicationCategory::Office),
            "Communication" => Ok(ApplicationCategory::Communication),
            "TextEditor" => Ok(ApplicationCategory::TextEditor),
            "Terminal" => Ok(ApplicationCategory::Terminal),
            "Unknown" => Ok(ApplicationCategory::Unknown),
            other => Err(anyhow::anyhow!("unknown application category: {other}")),
        }
    }
}

/// Special-handling tag vocabulary understood by the compatibility-aware
/// injector. Unknown tags in a profile are safely ignored.
pub mod tags {
    pub const UNICODE: &str = "unicode";
    pub const NEWLINE: &str = "newline";
    pub const TAB: &str = "tab";
    pub const SYNTAX_CHARS: &str = "syntax_chars";
    pub const FORMATTING: &str = "formatting";
    pub const EMOJI: &str = "emoji";
    pub const WEB_FORMS: &str = "web_forms";
}

/// Compatibility profile for a classified application. A value object:
/// resolved once per injection call and passed by copy, never consulted
/// from a second table.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationCompatibility {
    pub category: ApplicationCategory,
    pub is_compatible: bool,
    pub preferred_method: InjectionMethod,
    pub requires_special_handling: Vec<String>,
    /// Open string-keyed map of auxiliary flags (e.g. `editor_type`).
    pub application_settings: HashMap<String, String>,
}

impl ApplicationCompatibility {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.requires_special_handling.iter().any(|t| t == tag)
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.application_settings.get(key).map(|s| s.as_str())
    }

    fn incompatible() -> Self {
        Self {
            category: ApplicationCategory::Unknown,
            is_compatible: false,
            preferred_method: InjectionMethod::SendInput,
            requires_special_handling: Vec::new(),
            application_settings: HashMap::new(),
        }
    }
}

/// One ordered classification rule: case-insensitive substring patterns
/// mapping to a category. First matching rule wins.
#[derive(Debug, Clone)]
pub struct ClassifierRule {
    pub patterns: Vec<&'static str>,
    pub category: ApplicationCategory,
}

/// Immutable classification and profile data. Built once (usually via
/// [`CompatibilityTable::standard`]) and shared read-only.
pub struct CompatibilityTable {
    rules: Vec<ClassifierRule>,
    profiles: HashMap<ApplicationCategory, ApplicationCompatibility>,
}

impl CompatibilityTable {
    /// Build a table from explicit rules and profiles. Rules are evaluated
    /// in order; profiles missing a listed category fall back to Unknown.
    pub fn new(
        rules: Vec<ClassifierRule>,
        profiles: HashMap<ApplicationCategory, ApplicationCompatibility>,
    ) -> Self {
        Self { rules, profiles }
    }

    /// The standard table of known applications. Order matters: development
    /// tools precede plain text editors so "notepad++" never falls through
    /// to the "notepad" pattern.
    pub fn standard() -> Self {
        let rules = vec![
            ClassifierRule {
                patterns: vec!["chrome", "firefox", "msedge", "opera", "brave"],
                category: ApplicationCategory::Browser,
            },
            ClassifierRule {
                patterns: vec!["devenv", "code", "sublime", "notepad++", "rider", "idea"],
                category: ApplicationCategory::DevelopmentTool,
            },
            ClassifierRule {
                patterns: vec!["winword", "excel", "powerpnt", "outlook", "onenote"],
                category: ApplicationCategory::Office,
            },
            ClassifierRule {
                patterns: vec!["slack", "discord", "teams", "zoom"],
                category: ApplicationCategory::Communication,
            },
            ClassifierRule {
                patterns: vec!["notepad", "wordpad", "write"],
                category: ApplicationCategory::TextEditor,
            },
            ClassifierRule {
                patterns: vec!["cmd", "powershell", "pwsh", "windowsterminal"],
                category: ApplicationCategory::Terminal,
            },
        ];

        let mut profiles = HashMap::new();
        for category in [
            ApplicationCategory::Browser,
            ApplicationCategory::DevelopmentTool,
            ApplicationCategory::Office,
            ApplicationCategory::Communication,
            ApplicationCategory::TextEditor,
            ApplicationCategory::Terminal,
            ApplicationCategory::Unknown,
        ] {
            profiles.insert(category, Self::standard_profile(category));
        }

        Self { rules, profiles }
    }

    /// Fixed per-category profile used identically across the whole category.
    fn standard_profile(category: ApplicationCategory) -> ApplicationCompatibility {
        let (preferred_method, tags, settings): (_, &[&str], &[(&str, &str)]) = match category {
            // Content-editable regions behave differently from native input
            // fields, so browsers get unicode + web-form handling.
            ApplicationCategory::Browser => (
                InjectionMethod::SendInput,
                &[tags::UNICODE, tags::WEB_FORMS],
                &[],
            ),
            // IDEs trigger auto-complete and bracket matching that needs
            // settle time around syntax characters.
            ApplicationCategory::DevelopmentTool => (
                InjectionMethod::SendInput,
                &[tags::UNICODE, tags::SYNTAX_CHARS, tags::TAB, tags::NEWLINE],
                &[("editor_type", "ide")],
            ),
            // Office's rich-text layer frequently drops or garbles rapid raw
            // Unicode key events, so paste is preferred.
            ApplicationCategory::Office => (
                InjectionMethod::ClipboardFallback,
                &[tags::UNICODE, tags::FORMATTING],
                &[("office_app", "true")],
            ),
            ApplicationCategory::Communication => (
                InjectionMethod::SendInput,
                &[tags::UNICODE, tags::EMOJI],
                &[],
            ),
            ApplicationCategory::TextEditor => {
                (InjectionMethod::SendInput, &[], &[("editor_type", "plain")])
            }
            ApplicationCategory::Terminal => (
                InjectionMethod::SendInput,
                &[tags::NEWLINE],
                &[("terminal", "true")],
            ),
            ApplicationCategory::Unknown => (InjectionMethod::SendInput, &[], &[]),
        };

        ApplicationCompatibility {
            category,
            is_compatible: true,
            preferred_method,
            requires_special_handling: tags.iter().map(|t| t.to_string()).collect(),
            application_settings: settings
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Classify a window snapshot into its compatibility profile. Pure in
    /// the process name: identical input always yields an identical profile.
    pub fn classify(&self, window: &WindowInfo) -> ApplicationCompatibility {
        if !window.has_focus {
            return ApplicationCompatibility::incompatible();
        }

        let name = window.process_name.to_lowercase();
        for rule in &self.rules {
            if rule.patterns.iter().any(|p| name.contains(p)) {
                return self
                    .profiles
                    .get(&rule.category)
                    .cloned()
                    .unwrap_or_else(ApplicationCompatibility::incompatible);
            }
        }

        // No rule matched: compatibility is decided by the deny-list alone.
        let mut profile = self
            .profiles
            .get(&ApplicationCategory::Unknown)
            .cloned()
            .unwrap_or_else(ApplicationCompatibility::incompatible);
        profile.is_compatible = !probe::is_denied_process(&window.process_name);
        profile
    }

    /// Apply user-supplied profile overrides from a JSON document keyed by
    /// category name. Fields absent from an override keep their standard
    /// values; `application_settings` entries merge rather than replace.
    /// Returns the number of categories touched.
    pub fn apply_overrides(&mut self, json: &str) -> Result<usize> {
        let overrides: TableOverrides = serde_json::from_str(json)?;
        let mut applied = 0;
        for (name, patch) in overrides.profiles {
            let category = ApplicationCategory::parse(&name)?;
            let profile = self
                .profiles
                .entry(category)
                .or_insert_with(|| Self::standard_profile(category));
            if let Some(method) = patch.preferred_method {
                profile.preferred_method = method;
            }
            if let Some(tags) = patch.requires_special_handling {
                profile.requires_special_handling = tags;
            }
            if let Some(settings) = patch.application_settings {
                profile.application_settings.extend(settings);
            }
            debug!(category = %category, "applied profile override");
            applied += 1;
        }
        Ok(applied)
    }
}

/// Partial per-category profile patch parsed from user configuration.
#[derive(Debug, Deserialize)]
struct ProfileOverride {
    #[serde(default)]
    preferred_method: Option<InjectionMethod>,
    #[serde(default)]
    requires_special_handling: Option<Vec<String>>,
    #[serde(default)]
    application_settings: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct TableOverrides {
    #[serde(default)]
    profiles: HashMap<String, ProfileOverride>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::WindowRect;

    fn window(process_name: &str) -> WindowInfo {
        WindowInfo {
            handle: 100,
            process_name: process_name.to_string(),
            process_id: 42,
            rect: WindowRect::default(),
            has_focus: true,
        }
    }

    #[test]
    fn documented_names_map_to_exactly_one_category() {
        let table = CompatibilityTable::standard();
        let cases = [
            ("chrome.exe", ApplicationCategory::Browser),
            ("firefox.exe", ApplicationCategory::Browser),
            ("msedge.exe", ApplicationCategory::Browser),
            ("devenv.exe", ApplicationCategory::DevelopmentTool),
            ("Code.exe", ApplicationCategory::DevelopmentTool),
            ("sublime_text.exe", ApplicationCategory::DevelopmentTool),
            ("notepad++.exe", ApplicationCategory::DevelopmentTool),
            ("WINWORD.EXE", ApplicationCategory::Office),
            ("excel.exe", ApplicationCategory::Office),
            ("powerpnt.exe", ApplicationCategory::Office),
            ("outlook.exe", ApplicationCategory::Office),
            ("slack.exe", ApplicationCategory::Communication),
            ("Discord.exe", ApplicationCategory::Communication),
            ("Teams.exe", ApplicationCategory::Communication),
            ("Zoom.exe", ApplicationCategory::Communication),
            ("notepad.exe", ApplicationCategory::TextEditor),
            ("wordpad.exe", ApplicationCategory::TextEditor),
            ("cmd.exe", ApplicationCategory::Terminal),
            ("powershell.exe", ApplicationCategory::Terminal),
            ("WindowsTerminal.exe", ApplicationCategory::Terminal),
        ];
        for (name, expected) in cases {
            let profile = table.classify(&window(name));
            assert_eq!(profile.category, expected, "process {name}");
            assert!(profile.is_compatible, "process {name}");
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let table = CompatibilityTable::standard();
        let a = table.classify(&window("chrome.exe"));
        let b = table.classify(&window("chrome.exe"));
        assert_eq!(a.category, b.category);
        assert_eq!(a.preferred_method, b.preferred_method);
        assert_eq!(a.requires_special_handling, b.requires_special_handling);
        assert_eq!(a.application_settings, b.application_settings);
    }

    #[test]
    fn office_prefers_clipboard_and_carries_office_setting() {
        let table = CompatibilityTable::standard();
        let profile = table.classify(&window("winword.exe"));
        assert_eq!(profile.preferred_method, InjectionMethod::ClipboardFallback);
        assert_eq!(profile.setting("office_app"), Some("true"));
        assert!(profile.has_tag(tags::UNICODE));
        assert!(profile.has_tag(tags::FORMATTING));
    }

    #[test]
    fn development_tools_carry_syntax_handling() {
        let table = CompatibilityTable::standard();
        let profile = table.classify(&window("devenv.exe"));
        assert_eq!(profile.preferred_method, InjectionMethod::SendInput);
        assert!(profile.has_tag(tags::SYNTAX_CHARS));
        assert!(profile.has_tag(tags::TAB));
        assert!(profile.has_tag(tags::NEWLINE));
        assert_eq!(profile.setting("editor_type"), Some("ide"));
    }

    #[test]
    fn unknown_process_is_compatible_unless_denied() {
        let table = CompatibilityTable::standard();

        let profile = table.classify(&window("someapp.exe"));
        assert_eq!(profile.category, ApplicationCategory::Unknown);
        assert!(profile.is_compatible);

        let denied = table.classify(&window("LogonUI.exe"));
        assert_eq!(denied.category, ApplicationCategory::Unknown);
        assert!(!denied.is_compatible);
    }

    #[test]
    fn unfocused_window_is_incompatible() {
        let table = CompatibilityTable::standard();
        let profile = table.classify(&WindowInfo::unfocused());
        assert_eq!(profile.category, ApplicationCategory::Unknown);
        assert!(!profile.is_compatible);
    }

    #[test]
    fn custom_table_overrides_standard_profiles() {
        let rules = vec![ClassifierRule {
            patterns: vec!["myapp"],
            category: ApplicationCategory::TextEditor,
        }];
        let mut profiles = HashMap::new();
        profiles.insert(
            ApplicationCategory::TextEditor,
            ApplicationCompatibility {
                category: ApplicationCategory::TextEditor,
                is_compatible: true,
                preferred_method: InjectionMethod::ClipboardFallback,
                requires_special_handling: vec![tags::NEWLINE.to_string()],
                application_settings: HashMap::new(),
            },
        );
        let table = CompatibilityTable::new(rules, profiles);

        let profile = table.classify(&window("myapp.exe"));
        assert_eq!(profile.preferred_method, InjectionMethod::ClipboardFallback);
        assert!(profile.has_tag(tags::NEWLINE));
    }

    #[test]
    fn json_overrides_patch_only_named_fields() {
        let mut table = CompatibilityTable::standard();
        let applied = table
            .apply_overrides(
                r#"{
                    "profiles": {
                        "Terminal": {
                            "preferred_method": "ClipboardFallback",
                            "application_settings": {"bracketed_paste": "true"}
                        }
                    }
                }"#,
            )
            .unwrap();
        assert_eq!(applied, 1);

        let profile = table.classify(&window("cmd.exe"));
        assert_eq!(profile.preferred_method, InjectionMethod::ClipboardFallback);
        // Untouched fields keep their standard values; settings merge.
        assert!(profile.has_tag(tags::NEWLINE));
        assert_eq!(profile.setting("bracketed_paste"), Some("true"));
        assert_eq!(profile.setting("terminal"), Some("true"));
    }

    #[test]
    fn unknown_category_name_in_overrides_is_an_error() {
        let mut table = CompatibilityTable::standard();
        let err = table
            .apply_overrides(r#"{"profiles": {"Spreadsheet": {}}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Spreadsheet"));
    }
}
