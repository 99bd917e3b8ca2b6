//! Key module for chord formation
//!
//! Tracks modifier key press/release events relayed from the page and
//! turns completed key combinations into canonical chords.

mod chord;
mod modifiers;
mod tracker;

pub use chord::{Chord, ChordError};
#[cfg(test)]
pub use tracker::KeyEventKind;
pub use tracker::{KeyEvent, KeyTracker};
