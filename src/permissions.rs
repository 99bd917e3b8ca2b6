//! Permission gate
//!
//! Platform calls declare the host capabilities they need. Dispatch is
//! refused up front when any of them hasn't been granted.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Host capability an action may need
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    Tabs,
    Scripting,
    ClipboardWrite,
    ClipboardRead,
    Sessions,
    BrowsingData,
    Notifications,
}

impl Permission {
    /// Granted until the extension reports otherwise
    pub const DEFAULT_GRANTED: [Permission; 4] = [
        Permission::Tabs,
        Permission::Scripting,
        Permission::ClipboardWrite,
        Permission::Notifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Tabs => "tabs",
            Permission::Scripting => "scripting",
            Permission::ClipboardWrite => "clipboardWrite",
            Permission::ClipboardRead => "clipboardRead",
            Permission::Sessions => "sessions",
            Permission::BrowsingData => "browsingData",
            Permission::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required permissions that are not granted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing permission: {}", join_names(.missing))]
pub struct PermissionError {
    pub missing: Vec<Permission>,
}

fn join_names(permissions: &[Permission]) -> String {
    permissions.iter().map(Permission::as_str).collect::<Vec<_>>().join(", ")
}

/// Set of granted permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGate {
    granted: BTreeSet<Permission>,
}

impl PermissionGate {
    pub fn new(granted: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }

    /// Replace the granted set wholesale
    pub fn replace(&mut self, granted: impl IntoIterator<Item = Permission>) {
        self.granted = granted.into_iter().collect();
    }

    pub fn is_granted(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }

    /// Check that every required permission is granted
    pub fn check(
        &self,
        required: impl IntoIterator<Item = Permission>,
    ) -> Result<(), PermissionError> {
        let missing: BTreeSet<Permission> = required
            .into_iter()
            .filter(|p| !self.is_granted(*p))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PermissionError {
                missing: missing.into_iter().collect(),
            })
        }
    }
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self::new(Permission::DEFAULT_GRANTED)
    }
}
