//! Toast messages shown after actions

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::ActionId;

const TRUNCATE_AT: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Info,
    Error,
}

/// A user-facing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub message: String,
    pub icon: String,
    pub level: ToastLevel,
}

impl Toast {
    fn info(message: impl Into<String>, icon: &str) -> Self {
        Self {
            message: message.into(),
            icon: icon.to_string(),
            level: ToastLevel::Info,
        }
    }

    /// Error toast; an empty message falls back to a generic one
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.is_empty() {
                "Operation failed".to_string()
            } else {
                message
            },
            icon: "fas fa-exclamation-circle".to_string(),
            level: ToastLevel::Error,
        }
    }

    pub fn extension_toggled(enabled: bool) -> Self {
        let state = if enabled { "enabled" } else { "disabled" };
        Self::info(format!("Quickeys {state}"), "fas fa-power-off")
    }

    /// Success toast for an action, given the result details of its last
    /// platform call. Actions without a message get no toast.
    pub fn for_action(action: ActionId, details: &Value) -> Option<Self> {
        let flag = |name: &str| details.get(name).and_then(Value::as_bool).unwrap_or(false);
        let count = |name: &str| details.get(name).and_then(Value::as_u64).unwrap_or(0);

        let toast = match action {
            ActionId::CopyTitle => Self::info("Page title copied to clipboard", "fas fa-heading"),
            ActionId::CopyUrl => Self::info("URL copied to clipboard", "fas fa-link"),
            ActionId::CopyAllLinks => Self::info(
                format!("{} links copied to clipboard", count("count")),
                "fas fa-copy",
            ),
            ActionId::ClearCacheAndReload => {
                Self::info("Cache cleared and page reloaded", "fas fa-sync-alt")
            }
            ActionId::CopySelection => Self::info("Selected text copied", "fas fa-copy"),
            ActionId::FillForm => Self::info("Form field filled", "fas fa-keyboard"),
            ActionId::PlayPause => {
                if flag("playing") {
                    Self::info("Media playing", "fas fa-play")
                } else {
                    Self::info("Media paused", "fas fa-pause")
                }
            }
            ActionId::MuteUnmute => {
                if flag("muted") {
                    Self::info("Audio muted", "fas fa-volume-mute")
                } else {
                    Self::info("Audio unmuted", "fas fa-volume-up")
                }
            }
            ActionId::VolumeUp => Self::info("Volume increased", "fas fa-volume-up"),
            ActionId::VolumeDown => Self::info("Volume decreased", "fas fa-volume-down"),
            ActionId::IncreaseFontSize => Self::info("Font size increased", "fas fa-text-height"),
            ActionId::DecreaseFontSize => Self::info("Font size decreased", "fas fa-text-height"),
            ActionId::CloseCookieNotices => {
                let closed = count("noticesClosed");
                let message = if closed == 0 {
                    "No cookie notices found".to_string()
                } else {
                    let outcome = match details.get("action").and_then(Value::as_str) {
                        Some("rejected") => "Rejected",
                        Some("hidden") => "Removed from page",
                        _ => "No action",
                    };
                    format!("Cookie notices handled ({closed}): {outcome}")
                };
                Self::info(message, "fas fa-cookie-bite")
            }
            ActionId::PasteAndGo => {
                let text = details.get("text").and_then(Value::as_str).unwrap_or_default();
                let text = truncate(text, TRUNCATE_AT);
                if flag("wasUrl") {
                    Self::info(format!("Navigating to URL: {text}"), "fas fa-link")
                } else {
                    Self::info(format!("Searching for: {text}"), "fas fa-search")
                }
            }
            ActionId::ToggleDarkMode => Self::info("Dark mode toggled", "fas fa-moon"),
            ActionId::ToggleReaderMode => Self::info("Reader mode toggled", "fas fa-book-reader"),
            ActionId::FocusAddressBar => Self::info("Address bar focused", "fas fa-search"),
            ActionId::Back => Self::info("Navigated back", "fas fa-arrow-left"),
            ActionId::Forward => Self::info("Navigated forward", "fas fa-arrow-right"),
            _ => return None,
        };

        Some(toast)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
