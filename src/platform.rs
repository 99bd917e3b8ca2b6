//! Host platform seam
//!
//! Handlers never talk to the browser directly; the dispatcher hands each
//! platform call to a `Platform`, which in the daemon is the IPC bridge to
//! the extension.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::PlatformCall;

/// Tab the key event came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i64>,
}

impl TabInfo {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Page details reported by the content script on load and navigation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub url: String,
    #[serde(default)]
    pub domain: String,
}

/// Errors from performing a platform call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("extension is not connected")]
    Disconnected,

    #[error("extension did not answer in time")]
    Timeout,

    #[error("{0}")]
    Failed(String),
}

/// Performs platform calls on the host browser
pub trait Platform {
    /// Perform one call, returning its result value (`null` when the call
    /// has none)
    fn execute(
        &mut self,
        call: &PlatformCall,
    ) -> impl Future<Output = Result<Value, PlatformError>> + Send;
}

#[cfg(test)]
pub use recording::RecordingPlatform;

#[cfg(test)]
mod recording {
    use std::collections::VecDeque;

    use super::*;

    /// Records every call and answers from a scripted queue
    #[derive(Debug, Default)]
    pub struct RecordingPlatform {
        pub calls: Vec<PlatformCall>,
        pub responses: VecDeque<Result<Value, PlatformError>>,
    }

    impl RecordingPlatform {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, response: Result<Value, PlatformError>) -> Self {
            self.responses.push_back(response);
            self
        }
    }

    impl Platform for RecordingPlatform {
        async fn execute(&mut self, call: &PlatformCall) -> Result<Value, PlatformError> {
            self.calls.push(call.clone());
            self.responses.pop_front().unwrap_or(Ok(Value::Null))
        }
    }
}
