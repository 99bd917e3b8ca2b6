//! Modifier key definitions and state tracking
//!
//! Provides the names of the modifier keys as reported by the page and a
//! struct for tracking which of them are currently held.

/// Modifier key names as they appear in `KeyboardEvent.key`
pub mod names {
    /// Control key
    pub const CONTROL: &str = "Control";
    /// Alt/Option key
    pub const ALT: &str = "Alt";
    /// Shift key
    pub const SHIFT: &str = "Shift";
    /// Meta/Command key
    pub const META: &str = "Meta";
}

/// One of the four tracked modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl Modifier {
    /// Canonical chord ordering
    pub const ORDER: [Modifier; 4] =
        [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Meta];

    /// Map a `KeyboardEvent.key` value to a modifier, if it is one
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            names::CONTROL => Some(Self::Ctrl),
            names::ALT => Some(Self::Alt),
            names::SHIFT => Some(Self::Shift),
            names::META => Some(Self::Meta),
            _ => None,
        }
    }

    /// Parse a modifier token from a chord string (case-insensitive)
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::Ctrl),
            "alt" | "option" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            "meta" | "cmd" | "command" => Some(Self::Meta),
            _ => None,
        }
    }

    /// Token used in canonical chord strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Shift => "shift",
            Self::Meta => "meta",
        }
    }
}

/// Tracks which modifier keys are currently pressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    /// Control key is held
    pub ctrl: bool,
    /// Alt/Option key is held
    pub alt: bool,
    /// Shift key is held
    pub shift: bool,
    /// Meta/Command key is held
    pub meta: bool,
}

impl ModifierState {
    /// Whether the given modifier is held
    pub fn is_held(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Ctrl => self.ctrl,
            Modifier::Alt => self.alt,
            Modifier::Shift => self.shift,
            Modifier::Meta => self.meta,
        }
    }

    /// Set or clear a single modifier
    pub fn set(&mut self, modifier: Modifier, held: bool) {
        match modifier {
            Modifier::Ctrl => self.ctrl = held,
            Modifier::Alt => self.alt = held,
            Modifier::Shift => self.shift = held,
            Modifier::Meta => self.meta = held,
        }
    }

    /// Held modifiers in canonical order
    pub fn held(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ORDER.into_iter().filter(|m| self.is_held(*m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = ModifierState::default();
        assert_eq!(state, ModifierState::default());
        assert_eq!(state.held().count(), 0);
    }

    #[test]
    fn test_held_order_is_canonical() {
        let state = ModifierState {
            ctrl: false,
            alt: true,
            shift: true,
            meta: true,
        };
        let held: Vec<_> = state.held().collect();
        assert_eq!(held, vec![Modifier::Alt, Modifier::Shift, Modifier::Meta]);
    }

    #[test]
    fn test_set_and_clear() {
        let mut state = ModifierState::default();
        state.set(Modifier::Ctrl, true);
        assert!(state.ctrl);
        assert_ne!(state, ModifierState::default());
        state.set(Modifier::Ctrl, false);
        assert_eq!(state, ModifierState::default());
    }

    #[test]
    fn test_modifier_tokens() {
        assert_eq!(Modifier::from_token("Control"), Some(Modifier::Ctrl));
        assert_eq!(Modifier::from_token("CMD"), Some(Modifier::Meta));
        assert_eq!(Modifier::from_token("option"), Some(Modifier::Alt));
        assert_eq!(Modifier::from_token("k"), None);
        assert_eq!(Modifier::from_key("Shift"), Some(Modifier::Shift));
        assert_eq!(Modifier::from_key("shift"), None);
    }
}
