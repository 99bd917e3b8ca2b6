//! Action dispatch
//!
//! Looks up the handler, gates on permissions and page restrictions, then
//! runs the emitted calls in order. The first failure stops the sequence.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::actions::{ActionContext, ActionError, ActionId, ActionRegistry};
use crate::permissions::PermissionGate;
use crate::platform::{Platform, TabInfo};

/// URL prefixes where page scripts cannot run
const RESTRICTED_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "edge://",
    "about:",
    "moz-extension://",
    "view-source:",
    "https://chrome.google.com/webstore",
    "https://chromewebstore.google.com",
];

fn is_restricted(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    RESTRICTED_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
}

/// Perform `action` for `tab`, returning the result details of the last
/// call that produced any.
pub async fn dispatch<P: Platform>(
    registry: &ActionRegistry,
    gate: &PermissionGate,
    platform: &mut P,
    action: ActionId,
    tab: &TabInfo,
    params: &BTreeMap<String, String>,
) -> Result<Value, ActionError> {
    let handler = registry.get(action).ok_or(ActionError::NotRegistered(action))?;
    let ctx = ActionContext { action, tab, params };
    let calls = handler.calls(&ctx)?;

    gate.check(
        handler
            .requires
            .iter()
            .copied()
            .chain(calls.iter().flat_map(|call| call.required_permissions())),
    )?;

    if calls.iter().any(|call| call.touches_page()) {
        if tab.url.is_empty() {
            return Err(ActionError::NoPage);
        }
        if is_restricted(&tab.url) {
            return Err(ActionError::RestrictedPage(tab.url.clone()));
        }
    }

    let mut details = Value::Null;
    for call in &calls {
        debug!(%action, ?call, "executing platform call");
        let value = platform.execute(call).await?;
        if !value.is_null() {
            details = value;
        }
    }

    Ok(details)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::actions::{PageScript, PlatformCall};
    use crate::permissions::{Permission, PermissionError};
    use crate::platform::{PlatformError, RecordingPlatform};

    fn no_params() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[tokio::test]
    async fn test_runs_calls_in_order() {
        let registry = ActionRegistry::with_builtins();
        let mut platform = RecordingPlatform::new();
        let tab = TabInfo::with_url("https://example.com");

        dispatch(
            &registry,
            &PermissionGate::new([Permission::BrowsingData]),
            &mut platform,
            ActionId::ClearCacheAndReload,
            &tab,
            &no_params(),
        )
        .await
        .unwrap();

        assert_eq!(
            platform.calls,
            vec![PlatformCall::ClearCache, PlatformCall::Reload { bypass_cache: true }]
        );
    }

    #[test]
    fn test_unregistered_action_rejected() {
        let mut platform = RecordingPlatform::new();
        let tab = TabInfo::with_url("https://example.com");

        let err = tokio_test::block_on(dispatch(
            &ActionRegistry::new(),
            &PermissionGate::default(),
            &mut platform,
            ActionId::NewTab,
            &tab,
            &no_params(),
        ))
        .unwrap_err();

        assert_eq!(err, ActionError::NotRegistered(ActionId::NewTab));
        assert!(platform.calls.is_empty());
    }

    #[tokio::test]
    async fn test_missing_permission_makes_no_call() {
        let registry = ActionRegistry::with_builtins();
        let mut platform = RecordingPlatform::new();
        let tab = TabInfo::with_url("https://example.com");

        let err = dispatch(
            &registry,
            &PermissionGate::default(),
            &mut platform,
            ActionId::ReopenClosedTab,
            &tab,
            &no_params(),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            ActionError::Permission(PermissionError {
                missing: vec![Permission::Sessions]
            })
        );
        assert!(platform.calls.is_empty());
    }

    #[tokio::test]
    async fn test_restricted_page_rejected() {
        let registry = ActionRegistry::with_builtins();
        let mut platform = RecordingPlatform::new();
        let tab = TabInfo::with_url("chrome://settings/");

        let err = dispatch(
            &registry,
            &PermissionGate::default(),
            &mut platform,
            ActionId::ToggleDarkMode,
            &tab,
            &no_params(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ActionError::RestrictedPage(_)));
        assert!(platform.calls.is_empty());
    }

    #[tokio::test]
    async fn test_browser_level_action_allowed_on_browser_pages() {
        let registry = ActionRegistry::with_builtins();
        let mut platform = RecordingPlatform::new();
        let tab = TabInfo::with_url("chrome://newtab/");

        dispatch(
            &registry,
            &PermissionGate::default(),
            &mut platform,
            ActionId::CloseTab,
            &tab,
            &no_params(),
        )
        .await
        .unwrap();
        assert_eq!(platform.calls, vec![PlatformCall::CloseTab]);
    }

    #[tokio::test]
    async fn test_details_from_script_result() {
        let registry = ActionRegistry::with_builtins();
        let mut platform = RecordingPlatform::new().respond(Ok(json!({"playing": true})));
        let tab = TabInfo::with_url("https://www.youtube.com/watch");

        let details = dispatch(
            &registry,
            &PermissionGate::default(),
            &mut platform,
            ActionId::PlayPause,
            &tab,
            &no_params(),
        )
        .await
        .unwrap();

        assert_eq!(details["playing"], true);
        assert_eq!(
            platform.calls,
            vec![PlatformCall::RunPageScript {
                script: PageScript::PlayPause
            }]
        );
    }

    #[tokio::test]
    async fn test_platform_failure_propagates() {
        let registry = ActionRegistry::with_builtins();
        let failure = PlatformError::Failed("no element".to_string());
        let mut platform = RecordingPlatform::new().respond(Err(failure));
        let tab = TabInfo::with_url("https://example.com");

        let err = dispatch(
            &registry,
            &PermissionGate::default(),
            &mut platform,
            ActionId::CopySelection,
            &tab,
            &no_params(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "no element");
    }
}
