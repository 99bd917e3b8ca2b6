//! Shortcut engine
//!
//! Composes the key tracker, resolver, permission gate, dispatcher and
//! toast queue around an explicitly owned context:
//! key events -> chord -> resolved shortcut -> permission check ->
//! dispatch -> optional toast.

mod context;
mod dispatch;
mod machine;

pub use machine::{EngineRequest, ShortcutEngine};
