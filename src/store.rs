//! Persisted key-value record
//!
//! Holds the shortcut mapping, settings and the enabled flag. The record
//! is always read and written as a whole.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::settings::Settings;
use crate::shortcuts::ShortcutMap;

/// Everything that is persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    pub shortcuts: ShortcutMap,
    pub settings: Settings,
}

/// JSON file backing the record
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the record, falling back to the default when it can't be read.
    pub fn load(&self) -> StoreRecord {
        self.try_load().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "failed to load store, using defaults");
            StoreRecord::default()
        })
    }

    /// Load the record.
    ///
    /// A missing file gives the default record. A file that can't be read
    /// or parsed is moved aside first so a later save never overwrites it;
    /// an error means it is still in place and must not be written over.
    pub fn try_load(&self) -> Result<StoreRecord> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no store file, using defaults");
            return Ok(StoreRecord::default());
        }

        match self.read() {
            Ok(record) => Ok(record),
            Err(e) => {
                let aside = self.set_aside().with_context(|| {
                    format!("unreadable store {} could not be moved aside", self.path.display())
                })?;
                warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "unreadable store moved aside, using defaults"
                );
                Ok(StoreRecord::default())
            }
        }
    }

    fn read(&self) -> Result<StoreRecord> {
        let content = std::fs::read_to_string(&self.path)?;
        let record = serde_json::from_str(&content)?;
        Ok(record)
    }

    fn set_aside(&self) -> Result<PathBuf> {
        let aside = self.path.with_extension("json.corrupt");
        std::fs::rename(&self.path, &aside)?;
        Ok(aside)
    }

    /// Load the record, resolving a missing `enabled` flag from
    /// `startupEnabled` and writing it back.
    pub fn load_resolved(&self) -> Result<StoreRecord> {
        let mut record = match self.try_load() {
            Ok(record) => record,
            Err(e) => {
                // Leave the unreadable file alone
                warn!(error = %e, "starting from defaults without touching the store");
                let mut record = StoreRecord::default();
                record.enabled = Some(record.settings.startup_enabled);
                return Ok(record);
            }
        };

        if record.enabled.is_none() {
            let enabled = record.settings.startup_enabled;
            info!(enabled, "no stored enabled flag, using startup setting");
            record.enabled = Some(enabled);
            self.save(&record)?;
        }
        Ok(record)
    }

    /// Write the whole record
    pub fn save(&self, record: &StoreRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("failed to create store directory")?;
        }

        let content = serde_json::to_string_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).context("failed to write store file")?;
        std::fs::rename(&tmp, &self.path).context("failed to replace store file")?;

        debug!(path = %self.path.display(), "store saved");
        Ok(())
    }
}
