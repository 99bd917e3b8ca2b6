//! Key-state tracker
//!
//! Accumulates modifier state from relayed page key events and forms a
//! chord when a non-modifier key goes down.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::chord::Chord;
use super::modifiers::{Modifier, ModifierState};

/// Key event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    Keydown,
    Keyup,
}

/// Simplified keyboard event relayed from the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    #[serde(rename = "type")]
    pub kind: KeyEventKind,
    pub key: String,
    #[serde(default)]
    pub key_code: u32,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub repeat: bool,
}

impl KeyEvent {
    /// Modifier flags carried on the event
    pub fn modifiers(&self) -> ModifierState {
        ModifierState {
            ctrl: self.ctrl_key,
            alt: self.alt_key,
            shift: self.shift_key,
            meta: self.meta_key,
        }
    }
}

/// Transient key state for the current session
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    pub modifiers: ModifierState,
    /// Last chord that completed
    pub last_key: Option<Chord>,
    /// When the last chord completed
    pub last_key_time: Option<Instant>,
}

/// Turns a stream of key events into completed chords
#[derive(Debug, Default)]
pub struct KeyTracker {
    state: KeyState,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, e.g. after the page loses focus
    pub fn reset(&mut self) {
        self.state = KeyState::default();
    }

    /// Feed one event. Returns the chord when a non-modifier keydown
    /// completes one that is not suppressed by `delay`.
    pub fn handle(&mut self, event: &KeyEvent, now: Instant, delay: Duration) -> Option<Chord> {
        // Flags on the event are authoritative
        self.state.modifiers = event.modifiers();

        if let Some(modifier) = Modifier::from_key(&event.key) {
            let held = event.kind == KeyEventKind::Keydown;
            self.state.modifiers.set(modifier, held);
            trace!(?modifier, held, "modifier changed");
            return None;
        }

        if event.kind != KeyEventKind::Keydown {
            return None;
        }

        let chord = Chord::from_parts(self.state.modifiers, &event.key)?;

        if self.is_suppressed(&chord, now, delay) {
            debug!(%chord, repeat = event.repeat, "chord suppressed by shortcut delay");
            return None;
        }

        self.state.last_key = Some(chord.clone());
        self.state.last_key_time = Some(now);
        Some(chord)
    }

    fn is_suppressed(&self, chord: &Chord, now: Instant, delay: Duration) -> bool {
        match (&self.state.last_key, self.state.last_key_time) {
            (Some(last), Some(at)) => last == chord && now.saturating_duration_since(at) < delay,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: KeyEventKind, key: &str, ctrl: bool, shift: bool) -> KeyEvent {
        KeyEvent {
            kind,
            key: key.to_string(),
            key_code: 0,
            ctrl_key: ctrl,
            alt_key: false,
            shift_key: shift,
            meta_key: false,
            repeat: false,
        }
    }

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn test_modifier_keydown_forms_no_chord() {
        let mut tracker = KeyTracker::new();
        let now = Instant::now();
        let down = event(KeyEventKind::Keydown, "Control", true, false);
        assert!(tracker.handle(&down, now, DELAY).is_none());
        assert!(tracker.state.modifiers.ctrl);
    }

    #[test]
    fn test_chord_on_non_modifier_keydown() {
        let mut tracker = KeyTracker::new();
        let now = Instant::now();
        tracker.handle(&event(KeyEventKind::Keydown, "Control", true, false), now, DELAY);
        tracker.handle(&event(KeyEventKind::Keydown, "Shift", true, true), now, DELAY);
        let chord = tracker
            .handle(&event(KeyEventKind::Keydown, "K", true, true), now, DELAY)
            .unwrap();
        assert_eq!(chord.as_str(), "ctrl+shift+k");
        assert_eq!(tracker.state.last_key.as_ref(), Some(&chord));
    }

    #[test]
    fn test_modifier_keyup_clears_flag() {
        let mut tracker = KeyTracker::new();
        let now = Instant::now();
        tracker.handle(&event(KeyEventKind::Keydown, "Control", true, false), now, DELAY);
        // Some pages report the released modifier as still set on its own keyup
        tracker.handle(&event(KeyEventKind::Keyup, "Control", true, false), now, DELAY);
        assert!(tracker.state.modifiers == ModifierState::default());
    }

    #[test]
    fn test_keyup_forms_no_chord() {
        let mut tracker = KeyTracker::new();
        let now = Instant::now();
        let up = event(KeyEventKind::Keyup, "k", true, false);
        assert!(tracker.handle(&up, now, DELAY).is_none());
    }

    #[test]
    fn test_repeat_within_delay_suppressed() {
        let mut tracker = KeyTracker::new();
        let start = Instant::now();
        let down = event(KeyEventKind::Keydown, "k", true, false);
        assert!(tracker.handle(&down, start, DELAY).is_some());
        assert!(tracker.handle(&down, start + Duration::from_millis(50), DELAY).is_none());
        assert!(tracker.handle(&down, start + Duration::from_millis(150), DELAY).is_some());
    }

    #[test]
    fn test_different_chord_not_suppressed() {
        let mut tracker = KeyTracker::new();
        let start = Instant::now();
        let k = event(KeyEventKind::Keydown, "k", true, false);
        let j = event(KeyEventKind::Keydown, "j", true, false);
        assert!(tracker.handle(&k, start, DELAY).is_some());
        assert!(tracker.handle(&j, start, DELAY).is_some());
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{
            "type": "keydown", "key": "k", "keyCode": 75, "ctrlKey": true,
            "altKey": false, "shiftKey": true, "metaKey": false, "repeat": false
        }"#;
        let event: KeyEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, KeyEventKind::Keydown);
        assert_eq!(event.key_code, 75);
        assert!(event.modifiers().ctrl && event.modifiers().shift);
    }
}
