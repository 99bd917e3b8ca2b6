//! Toast queue
//!
//! Toasts are shown strictly one at a time: each stays up for a fixed
//! display time, then a short gap passes before the next one.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::messages::Toast;

/// How long a toast stays visible
const DISPLAY_FOR: Duration = Duration::from_millis(2000);
/// Pause between two toasts
const GAP: Duration = Duration::from_millis(250);

/// Handle for enqueuing toasts
#[derive(Debug, Clone)]
pub struct ToastQueue {
    tx: mpsc::Sender<Toast>,
}

impl ToastQueue {
    /// Create a queue and the pump that drains it
    pub fn new(capacity: usize) -> (Self, ToastPump) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self { tx },
            ToastPump { rx },
        )
    }

    /// Enqueue a toast. Drops it when the queue is full or closed.
    pub fn push(&self, toast: Toast) {
        if let Err(e) = self.tx.try_send(toast) {
            warn!(error = %e, "dropping toast");
        }
    }
}

/// Drains the queue with fixed pacing
pub struct ToastPump {
    rx: mpsc::Receiver<Toast>,
}

impl ToastPump {
    /// Take the next queued toast without pacing
    #[cfg(test)]
    pub fn try_next(&mut self) -> Result<Toast, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }

    /// Run until every queue handle is dropped, handing each toast to
    /// `show` in order.
    pub async fn run<F>(mut self, mut show: F)
    where
        F: FnMut(Toast),
    {
        while let Some(toast) = self.rx.recv().await {
            debug!(message = %toast.message, "showing toast");
            show(toast);
            tokio::time::sleep(DISPLAY_FOR + GAP).await;
        }
        debug!("toast queue closed");
    }
}
