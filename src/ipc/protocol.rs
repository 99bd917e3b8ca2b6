//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::{ActionCategory, ActionId, PlatformCall};
use crate::events::EngineEvent;
use crate::keys::KeyEvent;
use crate::notify::Toast;
use crate::permissions::Permission;
use crate::platform::{PageInfo, PlatformError, TabInfo};
use crate::settings::Settings;
use crate::shortcuts::{ShortcutMap, ShortcutRecord};

/// Largest accepted frame
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Requests from the extension to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request `{ enabled, shortcutsCount }`
    GetState,

    /// Key event relayed from a page
    KeyEvent {
        event: KeyEvent,
        #[serde(default)]
        tab: Option<TabInfo>,
    },

    /// The content script loaded or the page navigated
    PageInfo { page: PageInfo },

    /// A browser command shortcut fired
    Command { command: String },

    /// Switch the extension on/off; flips it when `enabled` is absent
    ToggleExtension {
        #[serde(default)]
        enabled: Option<bool>,
    },

    /// Save one shortcut under `chord` (last write wins)
    SaveShortcut { chord: String, shortcut: ShortcutRecord },

    /// Remove every shortcut bound to `chord`
    DeleteShortcut { chord: String },

    /// Remove one binding: the global one, or the site one with `site_pattern`
    DeleteBinding {
        chord: String,
        #[serde(default)]
        site_pattern: Option<String>,
    },

    /// Return the whole shortcut mapping
    ListShortcuts,

    /// Return the action catalog for the options page
    ListActions,

    /// The stored shortcuts were changed elsewhere
    ShortcutsChanged,

    /// The stored settings were changed elsewhere
    SettingsChanged,

    /// Replace the settings record
    UpdateSettings { settings: Settings },

    /// The granted permission set changed
    PermissionsChanged { granted: Vec<Permission> },

    /// Subscribe to host calls, toasts and engine events
    Subscribe,

    /// Result of a pushed host call
    HostCallResult { id: u64, result: HostCallResult },
}

/// What the extension reports after performing a host call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostCallResult {
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostCallResult {
    pub fn into_result(self) -> Result<Value, PlatformError> {
        match self.error {
            Some(error) => Err(PlatformError::Failed(error)),
            None => Ok(self.value),
        }
    }
}

/// What happened to a key event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum KeyOutcome {
    /// Not a chord, suppressed, or the extension is disabled
    Ignored,
    /// No shortcut bound to the chord
    Unbound,
    /// Bound, but no shortcut applies to this page
    Dropped,
    Dispatched { action: ActionId },
    Failed { action: ActionId, error: String },
}

/// `getState` answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    pub enabled: bool,
    pub shortcuts_count: usize,
}

/// One catalog entry as shown on the options page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub id: ActionId,
    pub label: String,
    pub category: ActionCategory,
}

impl From<ActionId> for ActionInfo {
    fn from(id: ActionId) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            category: id.category(),
        }
    }
}

/// Responses from daemon to extension
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    State(EngineState),

    KeyHandled(KeyOutcome),

    Shortcuts { shortcuts: ShortcutMap },

    Actions { actions: Vec<ActionInfo> },

    Ok,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Push messages from daemon to subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Push {
    /// Perform a host call and answer with `host_call_result`
    HostCall { id: u64, call: PlatformCall },

    /// Show a toast
    Toast { toast: Toast },

    /// Engine event occurred
    EngineEvent { event: EngineEvent },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_request() {
        let json = r#"{
            "type": "key_event",
            "event": {
                "type": "keydown", "key": "k", "keyCode": 75, "ctrlKey": true,
                "altKey": false, "shiftKey": true, "metaKey": false, "repeat": false
            },
            "tab": {"id": 7, "url": "https://mail.example.com/inbox"}
        }"#;
        let request: Request = serde_json::from_str(json).unwrap();
        match request {
            Request::KeyEvent { event, tab } => {
                assert_eq!(event.key, "k");
                assert_eq!(tab.unwrap().id, Some(7));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::State(EngineState {
            enabled: true,
            shortcuts_count: 3,
        });
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"type":"state","enabled":true,"shortcutsCount":3}"#);

        let resp = Response::KeyHandled(KeyOutcome::Dispatched {
            action: ActionId::NewTab,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["outcome"], "dispatched");
        assert_eq!(json["action"], "newTab");
    }

    #[test]
    fn test_host_call_result() {
        let json = r#"{"type":"host_call_result","id":4,"result":{"value":{"playing":true}}}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        let Request::HostCallResult { id, result } = request else {
            panic!("wrong request");
        };
        assert_eq!(id, 4);
        assert_eq!(result.into_result().unwrap()["playing"], true);

        let failed = HostCallResult {
            value: Value::Null,
            error: Some("no tab".to_string()),
        };
        assert_eq!(failed.into_result(), Err(PlatformError::Failed("no tab".to_string())));
    }

    #[test]
    fn test_action_catalog_entry() {
        let json = serde_json::to_value(ActionInfo::from(ActionId::OpenHistory)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "openHistory", "label": "Open History", "category": "chrome"})
        );
    }

    #[test]
    fn test_push_serialization() {
        let push = Push::HostCall {
            id: 1,
            call: PlatformCall::CloseTab,
        };
        let json = serde_json::to_value(&push).unwrap();
        assert_eq!(json["type"], "host_call");
        assert_eq!(json["call"]["call"], "close_tab");
    }
}
