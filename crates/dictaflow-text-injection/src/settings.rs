//! # Settings Provider boundary
//!
//! Optional collaborator that notifies the engine of configuration changes.
//! The engine subscribes if a provider is attached and re-reads its default
//! options when a relevant category changes; it functions correctly with no
//! provider attached.

use crate::types::InjectionOptions;
use tokio::sync::broadcast;

/// Settings categories the injection engine reacts to.
pub const CATEGORY_TEXT_INJECTION: &str = "TextInjection";
pub const CATEGORY_UI: &str = "UI";

/// A change notification from the host's settings store.
#[derive(Debug, Clone)]
pub struct SettingsChange {
    pub category: String,
}

impl SettingsChange {
    /// Whether this change affects injection behavior.
    pub fn affects_injection(&self) -> bool {
        self.category == CATEGORY_TEXT_INJECTION || self.category == CATEGORY_UI
    }
}

/// Host-side settings store the engine can subscribe to.
pub trait SettingsProvider: Send + Sync {
    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<SettingsChange>;

    /// Current injection options as configured by the user.
    fn injection_options(&self) -> InjectionOptions;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_injection_and_ui_categories_are_relevant() {
        assert!(SettingsChange {
            category: CATEGORY_TEXT_INJECTION.to_string()
        }
        .affects_injection());
        assert!(SettingsChange {
            category: CATEGORY_UI.to_string()
        }
        .affects_injection());
        assert!(!SettingsChange {
            category: "Audio".to_string()
        }
        .affects_injection());
    }
}
