//! User settings record

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Precedence between site-scoped and global shortcuts sharing a chord
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictMode {
    /// A chord claimed by site shortcuts is dropped outside those sites
    #[default]
    SiteFirst,
    /// Fall back to the global shortcut when no site pattern matches
    GlobalFirst,
}

/// Persisted toggles, stored under the `settings` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Initial `enabled` value when none has been stored yet
    pub startup_enabled: bool,
    /// Show toasts after actions
    pub notifications: bool,
    pub conflict_mode: ConflictMode,
    /// Minimum milliseconds between two firings of the same chord
    pub shortcut_delay: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            startup_enabled: true,
            notifications: true,
            conflict_mode: ConflictMode::SiteFirst,
            shortcut_delay: 100,
        }
    }
}

impl Settings {
    pub fn shortcut_delay(&self) -> Duration {
        Duration::from_millis(self.shortcut_delay)
    }
}
