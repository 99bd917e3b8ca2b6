//! quickeys-daemon: shortcut engine for the QuicKeys browser extension
//!
//! The extension relays key events, page changes and edits over a Unix
//! socket. The daemon owns:
//! - Chord detection from raw key events
//! - Shortcut storage and site-pattern conflict resolution
//! - Permission-gated action dispatch, performed by the extension as host calls
//! - A paced toast queue

mod actions;
mod config;
mod engine;
mod events;
mod ipc;
mod keys;
mod lifecycle;
mod notify;
mod permissions;
mod platform;
mod settings;
mod shortcuts;
mod store;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::engine::ShortcutEngine;
use crate::events::EngineEvent;
use crate::ipc::{BridgePlatform, HostCalls, Push, Server};
use crate::lifecycle::ShutdownSignal;
use crate::notify::ToastQueue;
use crate::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "quickeys-daemon starting");

    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, ?config.store_path, "configuration loaded");

    let shutdown = ShutdownSignal::new();

    // IPC server -> engine
    let (engine_tx, engine_rx) = mpsc::channel(64);
    // Daemon -> subscribed clients (host calls, toasts, events)
    let (push_tx, _) = broadcast::channel::<Push>(128);
    // Engine -> observers
    let (event_tx, mut event_rx) = broadcast::channel::<EngineEvent>(64);

    let host_calls = HostCalls::new(push_tx.clone());
    let platform = BridgePlatform::new(host_calls.clone(), config.host_call_timeout);
    let (toasts, toast_pump) = ToastQueue::new(32);

    let store = Store::new(&config.store_path);
    let mut engine = ShortcutEngine::new(store, platform, toasts, event_tx)?;
    let server = Server::new(&config.socket_path, engine_tx, host_calls, push_tx.clone())?;

    info!("daemon initialized, entering main loop");

    let toast_push_tx = push_tx.clone();

    tokio::select! {
        _ = engine.run(engine_rx) => {
            info!("engine exited");
        }

        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        _ = toast_pump.run(move |toast| {
            // No subscriber means nobody can show it
            let _ = toast_push_tx.send(Push::Toast { toast });
        }) => {
            info!("toast pump exited");
        }

        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        info!(%event, "engine event");
                        let _ = push_tx.send(Push::EngineEvent { event });
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "engine event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("engine event handler exited");
        }

        result = shutdown.wait() => {
            match result {
                Ok(()) => info!("shutdown signal received"),
                Err(e) => error!(?e, "failed to install signal handlers"),
            }
        }
    }

    info!("shutting down...");
    server.shutdown().await;
    info!("quickeys-daemon stopped");

    Ok(())
}
