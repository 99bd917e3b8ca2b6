//! Shortcut definitions and the chord-keyed mapping
//!
//! The persisted mapping is an object keyed by chord string. A chord may
//! hold one global shortcut and any number of site shortcuts, so the value
//! under a chord is either a single shortcut object or an array of them.
//! Stored entries are converted one at a time; a bad entry is skipped
//! without losing the rest of the mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::actions::{ActionId, UnknownAction};
use crate::keys::{Chord, ChordError};

use super::pattern::{PatternError, SitePattern};

/// Errors that can occur when building a shortcut from its stored form
#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    #[error(transparent)]
    Chord(#[from] ChordError),

    #[error(transparent)]
    UnknownAction(#[from] UnknownAction),

    #[error("site shortcut has no site pattern")]
    MissingSitePattern,

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("malformed shortcut: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Stored scope tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    #[default]
    Global,
    Site,
}

/// Where a shortcut applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Global,
    Site(SitePattern),
}

impl Scope {
    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::Global => ScopeKind::Global,
            Scope::Site(_) => ScopeKind::Site,
        }
    }
}

/// A chord bound to an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub chord: Chord,
    pub action: ActionId,
    pub params: BTreeMap<String, String>,
    pub scope: Scope,
}

impl Shortcut {
    /// A global shortcut with no params
    pub fn global(chord: Chord, action: ActionId) -> Self {
        Self {
            chord,
            action,
            params: BTreeMap::new(),
            scope: Scope::Global,
        }
    }

    /// A site shortcut restricted to URLs matching `pattern`
    pub fn site(chord: Chord, action: ActionId, pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            chord,
            action,
            params: BTreeMap::new(),
            scope: Scope::Site(SitePattern::compile(pattern)?),
        })
    }

    /// Build from the stored record found under `chord`
    pub fn from_record(chord: Chord, record: &ShortcutRecord) -> Result<Self, ShortcutError> {
        let action: ActionId = record.action.parse()?;
        let scope = match record.scope {
            ScopeKind::Global => Scope::Global,
            ScopeKind::Site => {
                let pattern = record
                    .site_pattern
                    .as_deref()
                    .ok_or(ShortcutError::MissingSitePattern)?;
                Scope::Site(SitePattern::compile(pattern)?)
            }
        };

        Ok(Self {
            chord,
            action,
            params: record.params.clone(),
            scope,
        })
    }

    /// Stored form
    pub fn to_record(&self) -> ShortcutRecord {
        ShortcutRecord {
            action: self.action.to_string(),
            scope: self.scope.kind(),
            site_pattern: match &self.scope {
                Scope::Global => None,
                Scope::Site(pattern) => Some(pattern.as_str().to_string()),
            },
            params: self.params.clone(),
        }
    }

    /// True when `other` occupies the same (chord, scope, pattern) slot
    fn same_slot(&self, other: &Shortcut) -> bool {
        self.chord == other.chord && self.scope == other.scope
    }
}

/// Stored form of a single shortcut
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutRecord {
    pub action: String,
    #[serde(rename = "type", default)]
    pub scope: ScopeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_pattern: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "scalar_params"
    )]
    pub params: BTreeMap<String, String>,
}

/// Accept strings, numbers and booleans as param values
fn scalar_params<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    let mut params = BTreeMap::new();
    for (name, value) in raw {
        let value = match value {
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null => continue,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "param '{name}' must be a scalar, got {other}"
                )))
            }
        };
        params.insert(name, value);
    }
    Ok(params)
}

/// Value written under a chord key
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StoredBinding {
    One(ShortcutRecord),
    Many(Vec<ShortcutRecord>),
}

/// Every shortcut bound to one chord
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChordBindings {
    pub global: Option<Shortcut>,
    /// Site shortcuts in insertion order
    pub sites: Vec<Shortcut>,
}

impl ChordBindings {
    pub fn is_empty(&self) -> bool {
        self.global.is_none() && self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shortcut> {
        self.sites.iter().chain(self.global.iter())
    }
}

/// The in-memory shortcut mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, StoredBinding>")]
pub struct ShortcutMap {
    bindings: BTreeMap<Chord, ChordBindings>,
}

impl ShortcutMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a shortcut, replacing the one in the same slot.
    ///
    /// Returns the replaced shortcut, if any.
    pub fn insert(&mut self, shortcut: Shortcut) -> Option<Shortcut> {
        let bindings = self.bindings.entry(shortcut.chord.clone()).or_default();
        match shortcut.scope {
            Scope::Global => bindings.global.replace(shortcut),
            Scope::Site(_) => {
                if let Some(existing) = bindings.sites.iter_mut().find(|s| s.same_slot(&shortcut)) {
                    Some(std::mem::replace(existing, shortcut))
                } else {
                    bindings.sites.push(shortcut);
                    None
                }
            }
        }
    }

    /// Remove every shortcut bound to `chord`
    pub fn remove_chord(&mut self, chord: &Chord) -> bool {
        self.bindings.remove(chord).is_some()
    }

    /// Remove one shortcut: the global one when `site_pattern` is `None`,
    /// otherwise the site shortcut with that pattern.
    pub fn remove_binding(&mut self, chord: &Chord, site_pattern: Option<&str>) -> bool {
        let Some(bindings) = self.bindings.get_mut(chord) else {
            return false;
        };

        let removed = match site_pattern {
            None => bindings.global.take().is_some(),
            Some(pattern) => {
                let before = bindings.sites.len();
                bindings.sites.retain(|s| match &s.scope {
                    Scope::Site(p) => !p.as_str().eq_ignore_ascii_case(pattern.trim()),
                    Scope::Global => true,
                });
                bindings.sites.len() != before
            }
        };

        if bindings.is_empty() {
            self.bindings.remove(chord);
        }
        removed
    }

    pub fn get(&self, chord: &Chord) -> Option<&ChordBindings> {
        self.bindings.get(chord)
    }

    /// Number of bound chords
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All shortcuts, ordered by chord
    pub fn iter(&self) -> impl Iterator<Item = &Shortcut> {
        self.bindings.values().flat_map(|b| b.iter())
    }
}

impl From<BTreeMap<String, Value>> for ShortcutMap {
    fn from(stored: BTreeMap<String, Value>) -> Self {
        let mut map = ShortcutMap::new();

        for (key, value) in stored {
            let chord = match Chord::parse(&key) {
                Ok(chord) => chord,
                Err(e) => {
                    warn!(chord = %key, error = %e, "skipping stored shortcut with invalid chord");
                    continue;
                }
            };

            let entries = match value {
                Value::Array(entries) => entries,
                entry => vec![entry],
            };

            for entry in entries {
                let shortcut = serde_json::from_value::<ShortcutRecord>(entry)
                    .map_err(ShortcutError::from)
                    .and_then(|record| Shortcut::from_record(chord.clone(), &record));
                match shortcut {
                    Ok(shortcut) => {
                        map.insert(shortcut);
                    }
                    Err(e) => {
                        warn!(%chord, error = %e, "skipping invalid stored shortcut");
                    }
                }
            }
        }

        map
    }
}

impl From<ShortcutMap> for BTreeMap<String, StoredBinding> {
    fn from(map: ShortcutMap) -> Self {
        map.bindings
            .into_iter()
            .filter_map(|(chord, bindings)| {
                let mut records: Vec<ShortcutRecord> =
                    bindings.iter().map(Shortcut::to_record).collect();
                let binding = match records.len() {
                    0 => return None,
                    1 => StoredBinding::One(records.remove(0)),
                    _ => StoredBinding::Many(records),
                };
                Some((chord.to_string(), binding))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(s: &str) -> Chord {
        Chord::parse(s).unwrap()
    }

    #[test]
    fn test_last_write_wins_for_global() {
        let mut map = ShortcutMap::new();
        map.insert(Shortcut::global(chord("ctrl+k"), ActionId::NewTab));
        let replaced = map.insert(Shortcut::global(chord("ctrl+k"), ActionId::CloseTab));
        assert_eq!(replaced.map(|s| s.action), Some(ActionId::NewTab));
        assert_eq!(map.len(), 1);
        let bindings = map.get(&chord("ctrl+k")).unwrap();
        assert_eq!(bindings.global.as_ref().unwrap().action, ActionId::CloseTab);
    }

    #[test]
    fn test_site_and_global_share_chord() {
        let mut map = ShortcutMap::new();
        map.insert(Shortcut::global(chord("ctrl+k"), ActionId::NewTab));
        map.insert(Shortcut::site(chord("ctrl+k"), ActionId::PlayPause, "*.youtube.com").unwrap());
        map.insert(Shortcut::site(chord("ctrl+k"), ActionId::CopyUrl, "*.example.com").unwrap());
        // same pattern replaces
        map.insert(Shortcut::site(chord("ctrl+k"), ActionId::MuteUnmute, "*.youtube.com").unwrap());

        let bindings = map.get(&chord("ctrl+k")).unwrap();
        assert_eq!(bindings.sites.len(), 2);
        assert_eq!(bindings.sites[0].action, ActionId::MuteUnmute);
        assert!(bindings.global.is_some());
        assert_eq!(map.len(), 1);
        assert_eq!(map.iter().count(), 3);
    }

    #[test]
    fn test_remove_chord_and_binding() {
        let mut map = ShortcutMap::new();
        map.insert(Shortcut::global(chord("ctrl+k"), ActionId::NewTab));
        map.insert(Shortcut::site(chord("ctrl+k"), ActionId::PlayPause, "*.youtube.com").unwrap());
        map.insert(Shortcut::global(chord("alt+t"), ActionId::NewTab));

        assert!(map.remove_binding(&chord("ctrl+k"), Some("*.YouTube.com")));
        assert!(map.get(&chord("ctrl+k")).unwrap().sites.is_empty());
        assert!(map.remove_binding(&chord("ctrl+k"), None));
        assert!(map.get(&chord("ctrl+k")).is_none());

        assert!(map.remove_chord(&chord("alt+t")));
        assert!(!map.remove_chord(&chord("alt+t")));
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_stored_mapping() {
        let json = r#"{
            "Shift+Ctrl+K": {"action": "newTab", "type": "global"},
            "alt+p": [
                {"action": "playPause", "type": "site", "sitePattern": "*.youtube.com"},
                {"action": "openUrl", "type": "global", "params": {"url": "https://example.com"}}
            ],
            "ctrl+x": {"action": "launchRocket", "type": "global"},
            "ctrl+y": {"action": "copyUrl", "type": "site"},
            "ctrl+": {"action": "newTab"}
        }"#;
        let map: ShortcutMap = serde_json::from_str(json).unwrap();

        assert_eq!(map.len(), 2);
        let k = map.get(&chord("ctrl+shift+k")).unwrap();
        assert_eq!(k.global.as_ref().unwrap().action, ActionId::NewTab);
        let p = map.get(&chord("alt+p")).unwrap();
        assert_eq!(p.sites.len(), 1);
        assert_eq!(
            p.global.as_ref().unwrap().params.get("url").map(String::as_str),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_bad_entry_skipped_alone() {
        let json = r#"{
            "ctrl+k": {"action": "newTab", "type": "global"},
            "ctrl+t": {"action": "closeTab", "type": "tab"},
            "alt+p": [
                {"action": "playPause", "type": "site", "sitePattern": "*.youtube.com"},
                {"action": "copyUrl", "type": "global", "params": {"nested": {"a": 1}}},
                "not a shortcut"
            ]
        }"#;
        let map: ShortcutMap = serde_json::from_str(json).unwrap();

        assert_eq!(map.len(), 2);
        assert!(map.get(&chord("ctrl+t")).is_none());
        let p = map.get(&chord("alt+p")).unwrap();
        assert_eq!(p.sites.len(), 1);
        assert!(p.global.is_none());
    }

    #[test]
    fn test_scalar_params_are_stringified() {
        let json = r#"{
            "ctrl+o": {
                "action": "openUrl",
                "type": "global",
                "params": {"url": "x.com", "newTab": false, "step": 5, "unused": null}
            }
        }"#;
        let map: ShortcutMap = serde_json::from_str(json).unwrap();

        let params = &map.get(&chord("ctrl+o")).unwrap().global.as_ref().unwrap().params;
        assert_eq!(params.get("newTab").map(String::as_str), Some("false"));
        assert_eq!(params.get("step").map(String::as_str), Some("5"));
        assert!(!params.contains_key("unused"));
    }

    #[test]
    fn test_store_format() {
        let mut map = ShortcutMap::new();
        map.insert(Shortcut::global(chord("ctrl+k"), ActionId::NewTab));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"ctrl+k": {"action": "newTab", "type": "global"}}));

        map.insert(Shortcut::site(chord("ctrl+k"), ActionId::PlayPause, "*.youtube.com").unwrap());
        let json = serde_json::to_value(&map).unwrap();
        assert!(json["ctrl+k"].is_array());
    }
}
