//! Events module for engine activity
//!
//! Structured events emitted by the engine as shortcuts fire, get
//! dropped or fail, and as its context changes.

use serde::{Deserialize, Serialize};

use crate::actions::ActionId;
use crate::keys::Chord;

/// Why a chord did not dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The extension is disabled
    Disabled,
    /// Bound only to site shortcuts that don't match the page
    NoSiteMatch,
}

/// Events emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A shortcut fired and its action completed
    ShortcutTriggered {
        chord: Chord,
        action: ActionId,
        url: String,
    },

    /// A bound chord was ignored
    ShortcutDropped { chord: Chord, reason: DropReason },

    /// The action could not be performed
    ActionFailed { action: ActionId, error: String },

    /// Dispatch refused for lack of permissions
    PermissionDenied { action: ActionId, missing: Vec<String> },

    /// Settings and shortcuts were reloaded from the store
    ContextReloaded { shortcuts: usize },

    /// The extension was switched on or off
    EnabledChanged { enabled: bool },
}

impl std::fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineEvent::ShortcutTriggered { chord, action, .. } => {
                write!(f, "SHORTCUT_TRIGGERED ({chord} -> {action})")
            }
            EngineEvent::ShortcutDropped { chord, reason } => {
                write!(f, "SHORTCUT_DROPPED ({chord}, {reason:?})")
            }
            EngineEvent::ActionFailed { action, error } => {
                write!(f, "ACTION_FAILED ({action}: {error})")
            }
            EngineEvent::PermissionDenied { action, missing } => {
                write!(f, "PERMISSION_DENIED ({action}: {})", missing.join(", "))
            }
            EngineEvent::ContextReloaded { shortcuts } => {
                write!(f, "CONTEXT_RELOADED ({shortcuts} shortcuts)")
            }
            EngineEvent::EnabledChanged { enabled } => write!(f, "ENABLED_CHANGED ({enabled})"),
        }
    }
}
