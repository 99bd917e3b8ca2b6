//! Unix domain socket server for IPC
//!
//! Provides request-response communication with the extension and pushes
//! host calls, toasts and engine events to subscribed clients.
//!
//! Each connection has a reader, an ordered responder and a writer. The
//! reader never waits on the engine, so a client can answer a host call
//! while one of its own requests is still being dispatched.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::EngineRequest;

use super::bridge::HostCalls;
use super::protocol::{Push, Request, Response, MAX_FRAME_LEN};

/// A response that is ready now or will come from the engine
#[derive(Debug)]
enum PendingReply {
    Ready(Response),
    Engine(oneshot::Receiver<Response>),
}

/// Handles shared by every connection
#[derive(Clone)]
struct Shared {
    engine_tx: mpsc::Sender<EngineRequest>,
    host_calls: HostCalls,
    push_tx: broadcast::Sender<Push>,
}

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    shared: Shared,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Create a new IPC server
    pub fn new(
        socket_path: &Path,
        engine_tx: mpsc::Sender<EngineRequest>,
        host_calls: HostCalls,
        push_tx: broadcast::Sender<Push>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            shared: Shared {
                engine_tx,
                host_calls,
                push_tx,
            },
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let shared = self.shared.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, shared) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(stream: UnixStream, shared: Shared) -> Result<()> {
        let (mut reader, writer) = stream.into_split();
        let (out_tx, out_rx) = mpsc::channel::<Vec<u8>>(64);
        let (reply_tx, reply_rx) = mpsc::channel::<PendingReply>(64);

        let writer_task = tokio::spawn(Self::write_frames(writer, out_rx));
        let responder_task = tokio::spawn(Self::respond_in_order(reply_rx, out_tx.clone()));
        let mut forwarder: Option<JoinHandle<()>> = None;

        let result = async {
            while let Some(frame) = Self::read_frame(&mut reader).await? {
                let request: Request = match serde_json::from_slice(&frame) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!(error = %e, "failed to parse request");
                        let response = Response::error("bad_request", e.to_string());
                        let reply = PendingReply::Ready(response);
                        reply_tx.send(reply).await.context("responder closed")?;
                        continue;
                    }
                };

                debug!(?request, "received request");

                let reply = match request {
                    Request::Ping => PendingReply::Ready(Response::Pong),

                    Request::Subscribe => {
                        if forwarder.is_none() {
                            debug!("client subscribed to pushes");
                            let push_rx = shared.push_tx.subscribe();
                            let task = Self::forward_pushes(push_rx, out_tx.clone());
                            forwarder = Some(tokio::spawn(task));
                        }
                        PendingReply::Ready(Response::Subscribed)
                    }

                    Request::HostCallResult { id, result } => {
                        shared.host_calls.complete(id, result).await;
                        PendingReply::Ready(Response::Ok)
                    }

                    request => {
                        let (tx, rx) = oneshot::channel();
                        shared
                            .engine_tx
                            .send(EngineRequest { request, reply: tx })
                            .await
                            .context("engine stopped")?;
                        PendingReply::Engine(rx)
                    }
                };

                reply_tx.send(reply).await.context("responder closed")?;
            }
            Ok::<(), anyhow::Error>(())
        }
        .await;

        if let Some(forwarder) = forwarder {
            forwarder.abort();
        }
        drop(reply_tx);
        drop(out_tx);
        let _ = responder_task.await;
        let _ = writer_task.await;

        result
    }

    /// Read one length-prefixed frame; `None` on clean disconnect
    async fn read_frame(reader: &mut OwnedReadHalf) -> Result<Option<Vec<u8>>> {
        let mut len_buf = [0u8; 4];

        // Read message length (4-byte little-endian)
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("client disconnected");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_FRAME_LEN {
            anyhow::bail!("message too large ({len} bytes)");
        }

        let mut msg_buf = vec![0u8; len];
        reader.read_exact(&mut msg_buf).await?;
        Ok(Some(msg_buf))
    }

    /// Encode a length-prefixed JSON message
    fn encode<T: serde::Serialize>(msg: &T) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(msg)?;
        let mut frame = Vec::with_capacity(body.len() + 4);
        frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Resolve replies in request order and queue them for writing
    async fn respond_in_order(
        mut reply_rx: mpsc::Receiver<PendingReply>,
        out_tx: mpsc::Sender<Vec<u8>>,
    ) {
        while let Some(reply) = reply_rx.recv().await {
            let response = match reply {
                PendingReply::Ready(response) => response,
                PendingReply::Engine(rx) => rx.await.unwrap_or_else(|_| {
                    Response::error("engine_unavailable", "engine dropped the request")
                }),
            };

            match Self::encode(&response) {
                Ok(frame) => {
                    if out_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!(?e, "failed to encode response"),
            }
        }
    }

    /// Copy pushes into this connection's outgoing queue
    async fn forward_pushes(mut push_rx: broadcast::Receiver<Push>, out_tx: mpsc::Sender<Vec<u8>>) {
        loop {
            match push_rx.recv().await {
                Ok(push) => {
                    let frame = match Self::encode(&push) {
                        Ok(frame) => frame,
                        Err(e) => {
                            error!(?e, "failed to encode push");
                            continue;
                        }
                    };
                    if out_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "push receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    async fn write_frames(mut writer: OwnedWriteHalf, mut out_rx: mpsc::Receiver<Vec<u8>>) {
        while let Some(frame) = out_rx.recv().await {
            if let Err(e) = writer.write_all(&frame).await {
                debug!(?e, "client write failed");
                break;
            }
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
