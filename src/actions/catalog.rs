//! Fixed catalog of action identifiers
//!
//! Identifiers are the camelCase names stored in the shortcut mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Grouping used by the options surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Navigation,
    Tabs,
    Windows,
    #[serde(rename = "chrome")]
    BrowserPages,
    Clipboard,
    Media,
    Page,
    Custom,
}

/// Unknown action name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

macro_rules! action_catalog {
    ($($variant:ident => ($id:literal, $label:literal, $category:ident),)*) => {
        /// Identifier of one of the built-in actions
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum ActionId {
            $($variant,)*
        }

        impl ActionId {
            /// Every action, in catalog order
            pub const ALL: &'static [ActionId] = &[$(ActionId::$variant,)*];

            /// Stored identifier
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ActionId::$variant => $id,)*
                }
            }

            /// Human readable name
            pub fn label(&self) -> &'static str {
                match self {
                    $(ActionId::$variant => $label,)*
                }
            }

            pub fn category(&self) -> ActionCategory {
                match self {
                    $(ActionId::$variant => ActionCategory::$category,)*
                }
            }
        }

        impl std::str::FromStr for ActionId {
            type Err = UnknownAction;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($id => Ok(ActionId::$variant),)*
                    other => Err(UnknownAction(other.to_string())),
                }
            }
        }
    };
}

action_catalog! {
    Back => ("back", "Go Back", Navigation),
    Forward => ("forward", "Go Forward", Navigation),
    Reload => ("reload", "Reload Page", Navigation),
    HardReload => ("hardReload", "Reload Ignoring Cache", Navigation),
    ClearCacheAndReload => ("clearCacheAndReload", "Clear Cache and Reload", Navigation),
    ScrollToTop => ("scrollToTop", "Scroll to Top", Navigation),
    ScrollToBottom => ("scrollToBottom", "Scroll to Bottom", Navigation),

    NewTab => ("newTab", "New Tab", Tabs),
    CloseTab => ("closeTab", "Close Tab", Tabs),
    NextTab => ("nextTab", "Next Tab", Tabs),
    PrevTab => ("prevTab", "Previous Tab", Tabs),
    FirstTab => ("firstTab", "First Tab", Tabs),
    LastTab => ("lastTab", "Last Tab", Tabs),
    ReopenClosedTab => ("reopenClosedTab", "Reopen Closed Tab", Tabs),
    DuplicateTab => ("duplicateTab", "Duplicate Tab", Tabs),
    PinTab => ("pinTab", "Pin/Unpin Tab", Tabs),
    MuteTab => ("muteTab", "Mute/Unmute Tab", Tabs),
    MoveTabLeft => ("moveTabLeft", "Move Tab Left", Tabs),
    MoveTabRight => ("moveTabRight", "Move Tab Right", Tabs),
    MoveTabToStart => ("moveTabToStart", "Move Tab to Start", Tabs),
    MoveTabToEnd => ("moveTabToEnd", "Move Tab to End", Tabs),
    CloseOtherTabs => ("closeOtherTabs", "Close Other Tabs", Tabs),
    CloseTabsToRight => ("closeTabsToRight", "Close Tabs to the Right", Tabs),
    DetachTab => ("detachTab", "Move Tab to New Window", Tabs),

    NewWindow => ("newWindow", "New Window", Windows),
    NewIncognitoWindow => ("newIncognitoWindow", "New Incognito Window", Windows),
    CloseWindow => ("closeWindow", "Close Window", Windows),
    Fullscreen => ("fullscreen", "Toggle Fullscreen", Windows),
    MinimizeWindow => ("minimizeWindow", "Minimize Window", Windows),
    MaximizeWindow => ("maximizeWindow", "Maximize Window", Windows),

    OpenBookmarks => ("openBookmarks", "Open Bookmarks", BrowserPages),
    OpenHistory => ("openHistory", "Open History", BrowserPages),
    OpenDownloads => ("openDownloads", "Open Downloads", BrowserPages),
    OpenExtensions => ("openExtensions", "Open Extensions", BrowserPages),
    OpenSettings => ("openSettings", "Open Settings", BrowserPages),

    CopyUrl => ("copyUrl", "Copy URL", Clipboard),
    CopyTitle => ("copyTitle", "Copy Page Title", Clipboard),
    CopyAllLinks => ("copyAllLinks", "Copy All Links", Clipboard),
    CopySelection => ("copySelection", "Copy Selection", Clipboard),
    PasteAndGo => ("pasteAndGo", "Paste and Go", Clipboard),

    PlayPause => ("playPause", "Play/Pause Media", Media),
    MuteUnmute => ("muteUnmute", "Mute/Unmute Media", Media),
    VolumeUp => ("volumeUp", "Volume Up", Media),
    VolumeDown => ("volumeDown", "Volume Down", Media),

    IncreaseFontSize => ("increaseFontSize", "Increase Font Size", Page),
    DecreaseFontSize => ("decreaseFontSize", "Decrease Font Size", Page),
    ResetFontSize => ("resetFontSize", "Reset Font Size", Page),
    ZoomIn => ("zoomIn", "Zoom In", Page),
    ZoomOut => ("zoomOut", "Zoom Out", Page),
    ZoomReset => ("zoomReset", "Reset Zoom", Page),
    ToggleDarkMode => ("toggleDarkMode", "Toggle Dark Mode", Page),
    ToggleReaderMode => ("toggleReaderMode", "Toggle Reader Mode", Page),
    CloseCookieNotices => ("closeCookieNotices", "Close Cookie Notices", Page),
    FocusAddressBar => ("focusAddressBar", "Focus Address Bar", Page),
    PrintPage => ("printPage", "Print Page", Page),

    OpenUrl => ("openUrl", "Open URL", Custom),
    CustomScript => ("customScript", "Run Custom Script", Custom),
    FillForm => ("fillForm", "Fill Form Field", Custom),
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ActionId {
    type Error = UnknownAction;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionId> for String {
    fn from(action: ActionId) -> Self {
        action.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for action in ActionId::ALL {
            assert_eq!(action.as_str().parse::<ActionId>().unwrap(), *action);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = ActionId::ALL.iter().map(|a| a.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ActionId::ALL.len());
    }

    #[test]
    fn test_unknown_action() {
        assert_eq!(
            "launchRocket".parse::<ActionId>(),
            Err(UnknownAction("launchRocket".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_stored_names() {
        let json = serde_json::to_string(&ActionId::NewTab).unwrap();
        assert_eq!(json, r#""newTab""#);
        let action: ActionId = serde_json::from_str(r#""openBookmarks""#).unwrap();
        assert_eq!(action, ActionId::OpenBookmarks);
        assert_eq!(action.category(), ActionCategory::BrowserPages);
    }
}
