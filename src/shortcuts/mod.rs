//! Shortcut mapping and resolution
//!
//! Shortcuts are keyed by canonical chord. Site-scoped shortcuts carry a
//! wildcard pattern matched against the tab URL; the conflict mode decides
//! whether a global shortcut on the same chord covers non-matching sites.

mod map;
mod pattern;
mod resolver;

#[cfg(test)]
pub use map::ScopeKind;
pub use map::{Shortcut, ShortcutMap, ShortcutRecord};
pub use resolver::{resolve, Resolution};
