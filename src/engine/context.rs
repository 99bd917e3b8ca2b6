//! Explicitly owned engine context
//!
//! Replaces process-wide settings/shortcut caches. Reloaded wholesale from
//! the store whenever it changes.

use crate::permissions::PermissionGate;
use crate::platform::{PageInfo, TabInfo};
use crate::settings::Settings;
use crate::shortcuts::ShortcutMap;
use crate::store::StoreRecord;

#[derive(Debug, Clone, Default)]
pub struct EngineContext {
    pub enabled: bool,
    pub settings: Settings,
    pub shortcuts: ShortcutMap,
    pub permissions: PermissionGate,
    /// Last page reported by the content script
    pub last_page: Option<PageInfo>,
}

impl EngineContext {
    pub fn from_record(record: StoreRecord) -> Self {
        let mut ctx = Self::default();
        ctx.reload(record);
        ctx
    }

    /// Replace the stored part of the context. Permissions and the last
    /// known page are not stored and survive the reload.
    pub fn reload(&mut self, record: StoreRecord) {
        self.enabled = record.enabled.unwrap_or(record.settings.startup_enabled);
        self.settings = record.settings;
        self.shortcuts = record.shortcuts;
    }

    /// Tab standing in for the last known page
    pub fn last_tab(&self) -> TabInfo {
        self.last_page
            .as_ref()
            .map(|page| TabInfo::with_url(page.url.clone()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Permission;

    #[test]
    fn test_enabled_defaults_to_startup_setting() {
        let mut record = StoreRecord::default();
        record.settings.startup_enabled = false;
        assert!(!EngineContext::from_record(record).enabled);
    }

    #[test]
    fn test_reload_keeps_runtime_state() {
        let mut ctx = EngineContext::from_record(StoreRecord::default());
        ctx.permissions.replace([Permission::Sessions]);
        ctx.last_page = Some(PageInfo {
            url: "https://example.com".to_string(),
            domain: "example.com".to_string(),
        });

        let mut record = StoreRecord::default();
        record.enabled = Some(false);
        ctx.reload(record);

        assert!(!ctx.enabled);
        assert!(ctx.permissions.is_granted(Permission::Sessions));
        assert_eq!(ctx.last_tab().url, "https://example.com");
    }
}
