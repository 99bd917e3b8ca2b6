//! Canonical chord strings
//!
//! A chord is the active modifiers in the fixed order `ctrl`, `alt`,
//! `shift`, `meta`, followed by the lowercased key, all joined with `+`.
//! Both captured key events and stored mapping keys go through the same
//! canonicalization so lookups are a plain string comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::modifiers::{Modifier, ModifierState};

/// Errors that can occur when parsing a chord string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChordError {
    #[error("chord is empty")]
    Empty,

    #[error("invalid chord syntax: '{0}'")]
    InvalidSyntax(String),

    #[error("chord '{0}' has no key")]
    MissingKey(String),

    #[error("chord '{0}' has more than one key")]
    MultipleKeys(String),
}

/// A canonical chord such as `ctrl+shift+k`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chord(String);

impl Chord {
    /// Build a chord from held modifiers and a `KeyboardEvent.key` value.
    ///
    /// Returns `None` when the key cannot complete a chord (a modifier
    /// itself, a dead key, or an empty/unidentified key).
    pub fn from_parts(modifiers: ModifierState, key: &str) -> Option<Self> {
        let key = normalize_key(key)?;
        Some(Self::compose(modifiers, &key))
    }

    /// Parse a user- or storage-supplied chord string into canonical form
    pub fn parse(input: &str) -> Result<Self, ChordError> {
        if input.trim().is_empty() && input != " " {
            return Err(ChordError::Empty);
        }

        // A trailing "++" means the key itself is '+'
        let (head, plus_key) = if input == "+" {
            ("", true)
        } else if let Some(head) = input.strip_suffix("++") {
            (head, true)
        } else {
            (input, false)
        };

        let mut modifiers = ModifierState::default();
        let mut key = plus_key.then(|| "+".to_string());

        if !head.is_empty() {
            for token in head.split('+') {
                if token.trim().is_empty() && token != " " {
                    return Err(ChordError::InvalidSyntax(input.to_string()));
                }
                if let Some(modifier) = Modifier::from_token(token.trim()) {
                    modifiers.set(modifier, true);
                    continue;
                }
                let normalized = normalize_key(token)
                    .ok_or_else(|| ChordError::InvalidSyntax(input.to_string()))?;
                if key.is_some() {
                    return Err(ChordError::MultipleKeys(input.to_string()));
                }
                key = Some(normalized);
            }
        }

        let key = key.ok_or_else(|| ChordError::MissingKey(input.to_string()))?;
        Ok(Self::compose(modifiers, &key))
    }

    fn compose(modifiers: ModifierState, key: &str) -> Self {
        let mut parts: Vec<&str> = modifiers.held().map(|m| m.as_str()).collect();
        parts.push(key);
        Self(parts.join("+"))
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lowercase a key name, mapping the space bar to `space`.
///
/// Returns `None` for keys that never complete a chord.
fn normalize_key(key: &str) -> Option<String> {
    if key == " " {
        return Some("space".to_string());
    }
    let trimmed = key.trim();
    if trimmed.is_empty() || Modifier::from_key(trimmed).is_some() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    match lower.as_str() {
        "dead" | "unidentified" | "control" | "alt" | "shift" | "meta" => None,
        _ => Some(lower),
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Chord {
    type Error = ChordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Chord> for String {
    fn from(chord: Chord) -> Self {
        chord.0
    }
}

impl std::str::FromStr for Chord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
