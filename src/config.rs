//! Configuration loading and management

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// Default wait for the extension to answer a host call
const DEFAULT_HOST_TIMEOUT_MS: u64 = 3000;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Persistent store holding shortcuts, settings and the enabled flag
    pub store_path: PathBuf,

    /// How long a dispatched platform call may wait for the extension
    pub host_call_timeout: Duration,
}

impl Config {
    /// Load configuration from environment and defaults
    ///
    /// `QUICKEYS_DATA_DIR` overrides the data directory and
    /// `QUICKEYS_HOST_TIMEOUT_MS` the host call timeout.
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os("QUICKEYS_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = std::env::var("HOME").context("HOME is not set")?;
                PathBuf::from(home).join(".local").join("share").join("quickeys")
            }
        };

        let host_call_timeout = match std::env::var("QUICKEYS_HOST_TIMEOUT_MS") {
            Ok(raw) => {
                let ms: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid QUICKEYS_HOST_TIMEOUT_MS: {raw:?}"))?;
                Duration::from_millis(ms)
            }
            Err(_) => Duration::from_millis(DEFAULT_HOST_TIMEOUT_MS),
        };

        Ok(Self::in_dir(&data_dir, host_call_timeout))
    }

    fn in_dir(data_dir: &Path, host_call_timeout: Duration) -> Self {
        Self {
            socket_path: data_dir.join("daemon.sock"),
            store_path: data_dir.join("store.json"),
            data_dir: data_dir.to_owned(),
            host_call_timeout,
        }
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}
