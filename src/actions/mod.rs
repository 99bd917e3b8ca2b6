//! Actions a shortcut can trigger
//!
//! The catalog names every built-in action, the registry maps each one to
//! a handler, and handlers emit typed platform calls.

mod calls;
mod catalog;
mod registry;

#[cfg(test)]
pub use calls::PageScript;
pub use calls::PlatformCall;
pub use catalog::{ActionCategory, ActionId, UnknownAction};
pub use registry::{ActionContext, ActionError, ActionRegistry};
