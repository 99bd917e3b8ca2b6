//! Platform calls emitted by action handlers
//!
//! A call is one host browser operation. The extension performs it and
//! reports the result back.

use serde::{Deserialize, Serialize};

use crate::permissions::Permission;

/// Tab to activate, relative to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabTarget {
    Next,
    Previous,
    First,
    Last,
}

/// Where to move the current tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabMove {
    Left,
    Right,
    Start,
    End,
}

/// Tabs to close around the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabSelection {
    Others,
    ToRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    ToggleFullscreen,
    Minimized,
    Maximized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomChange {
    In,
    Out,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollEdge {
    Top,
    Bottom,
}

/// Built-in scripts injected into the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "script", rename_all = "snake_case")]
pub enum PageScript {
    CopySelection,
    /// Result: `{ "count": n }`
    CopyAllLinks,
    /// Result: `{ "text": "...", "wasUrl": bool }`
    PasteAndGo,
    /// Result: `{ "playing": bool }`
    PlayPause,
    /// Result: `{ "muted": bool }`
    ToggleMute,
    AdjustVolume { step_percent: i32 },
    ScrollTo { edge: ScrollEdge },
    AdjustFontSize { step_percent: i32 },
    ResetFontSize,
    ToggleDarkMode,
    ToggleReaderMode,
    /// Result: `{ "noticesClosed": n, "action": "rejected" | "hidden" }`
    CloseCookieNotices,
    FillForm { value: String },
    Print,
}

impl PageScript {
    fn extra_permission(&self) -> Option<Permission> {
        match self {
            PageScript::CopySelection | PageScript::CopyAllLinks => {
                Some(Permission::ClipboardWrite)
            }
            PageScript::PasteAndGo => Some(Permission::ClipboardRead),
            _ => None,
        }
    }
}

/// One host platform operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum PlatformCall {
    NavigateHistory { delta: i32 },
    Reload { bypass_cache: bool },
    ClearCache,
    CreateTab { url: Option<String> },
    CloseTab,
    ActivateTab { target: TabTarget },
    RestoreSession,
    DuplicateTab,
    TogglePinned,
    ToggleTabMuted,
    MoveTab { to: TabMove },
    CloseTabs { which: TabSelection },
    DetachTab,
    CreateWindow { incognito: bool },
    CloseWindow,
    SetWindowState { state: WindowState },
    OpenUrl { url: String, new_tab: bool },
    WriteClipboard { text: String },
    FocusAddressBar,
    Zoom { change: ZoomChange },
    RunPageScript { script: PageScript },
    ExecuteCode { code: String },
}

impl PlatformCall {
    /// Capabilities this call needs
    pub fn required_permissions(&self) -> Vec<Permission> {
        match self {
            PlatformCall::ClearCache => vec![Permission::BrowsingData],
            PlatformCall::RestoreSession => vec![Permission::Sessions],
            PlatformCall::WriteClipboard { .. } => vec![Permission::ClipboardWrite],
            PlatformCall::ExecuteCode { .. } => vec![Permission::Scripting],
            PlatformCall::RunPageScript { script } => {
                let mut required = vec![Permission::Scripting];
                required.extend(script.extra_permission());
                required
            }
            _ => Vec::new(),
        }
    }

    /// Whether the call runs inside the page
    pub fn touches_page(&self) -> bool {
        matches!(
            self,
            PlatformCall::RunPageScript { .. } | PlatformCall::ExecuteCode { .. }
        )
    }
}
