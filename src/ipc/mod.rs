//! IPC module for extension-daemon communication

mod bridge;
mod protocol;
mod server;

pub use bridge::{BridgePlatform, HostCalls};
pub use protocol::{ActionInfo, EngineState, KeyOutcome, Push, Request, Response};
pub use server::Server;
