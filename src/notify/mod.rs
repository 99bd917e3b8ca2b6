//! User-facing toast notifications
//!
//! Messages are built from the action and its result; the queue paces
//! them so two toasts never overlap.

mod messages;
mod queue;

pub use messages::Toast;
#[cfg(test)]
pub use queue::ToastPump;
pub use queue::ToastQueue;
