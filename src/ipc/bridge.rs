//! Platform implementation that forwards calls to the extension
//!
//! Each call is pushed to subscribed clients with an id; the extension
//! performs it and answers with a `host_call_result` carrying that id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, oneshot, Mutex};
use tracing::{debug, warn};

use crate::actions::PlatformCall;
use crate::platform::{Platform, PlatformError};

use super::protocol::{HostCallResult, Push};

/// Host calls awaiting an answer from the extension
#[derive(Clone)]
pub struct HostCalls {
    pub(super) pending: Arc<Mutex<HashMap<u64, oneshot::Sender<HostCallResult>>>>,
    next_id: Arc<AtomicU64>,
    push_tx: broadcast::Sender<Push>,
}

impl HostCalls {
    pub fn new(push_tx: broadcast::Sender<Push>) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            push_tx,
        }
    }

    /// Deliver the extension's answer for call `id`
    pub async fn complete(&self, id: u64, result: HostCallResult) {
        match self.pending.lock().await.remove(&id) {
            Some(tx) => {
                let _ = tx.send(result);
            }
            None => warn!(id, "result for unknown or expired host call"),
        }
    }

    async fn forget(&self, id: u64) {
        self.pending.lock().await.remove(&id);
    }
}

/// `Platform` backed by subscribed IPC clients
pub struct BridgePlatform {
    calls: HostCalls,
    timeout: Duration,
}

impl BridgePlatform {
    pub fn new(calls: HostCalls, timeout: Duration) -> Self {
        Self { calls, timeout }
    }
}

impl Platform for BridgePlatform {
    async fn execute(&mut self, call: &PlatformCall) -> Result<Value, PlatformError> {
        let id = self.calls.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.calls.pending.lock().await.insert(id, tx);

        let push = Push::HostCall {
            id,
            call: call.clone(),
        };
        if self.calls.push_tx.send(push).is_err() {
            self.calls.forget(id).await;
            return Err(PlatformError::Disconnected);
        }
        debug!(id, ?call, "host call pushed");

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result.into_result(),
            Ok(Err(_)) => Err(PlatformError::Disconnected),
            Err(_) => {
                self.calls.forget(id).await;
                warn!(id, "host call timed out");
                Err(PlatformError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_no_subscriber_is_disconnected() {
        let (push_tx, _) = broadcast::channel(8);
        let mut platform = BridgePlatform::new(HostCalls::new(push_tx), Duration::from_millis(50));
        let result = platform.execute(&PlatformCall::CloseTab).await;
        assert_eq!(result, Err(PlatformError::Disconnected));
    }

    #[tokio::test]
    async fn test_result_is_delivered() {
        let (push_tx, mut push_rx) = broadcast::channel(8);
        let calls = HostCalls::new(push_tx);
        let mut platform = BridgePlatform::new(calls.clone(), Duration::from_secs(5));

        let extension = tokio::spawn(async move {
            let Ok(Push::HostCall { id, call }) = push_rx.recv().await else {
                panic!("expected a host call");
            };
            assert_eq!(call, PlatformCall::DuplicateTab);
            calls
                .complete(
                    id,
                    HostCallResult {
                        value: json!({"ok": true}),
                        error: None,
                    },
                )
                .await;
        });

        let value = platform.execute(&PlatformCall::DuplicateTab).await.unwrap();
        assert_eq!(value["ok"], true);
        extension.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_call_times_out() {
        let (push_tx, _push_rx) = broadcast::channel(8);
        let mut platform = BridgePlatform::new(HostCalls::new(push_tx), Duration::from_secs(3));
        let result = platform.execute(&PlatformCall::CloseWindow).await;
        assert_eq!(result, Err(PlatformError::Timeout));
    }
}
