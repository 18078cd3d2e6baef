//! huddle production server.
//!
//! Wraps the sans-IO [`huddle_core`] relay driver with real I/O: axum
//! WebSocket transport, a Tokio relay actor that owns the driver, and OS
//! randomness.
//!
//! # Components
//!
//! - [`RelayHandle`]: spawns and addresses the relay actor (driver owner)
//! - [`ws`]-routed socket tasks: transport glue per connection
//! - [`SystemEnv`]: production randomness

pub mod actor;
mod system_env;
mod ws;

pub use actor::{Command, RelayHandle};
use axum::{Router, routing::get};
pub use system_env::SystemEnv;

/// Build the HTTP router serving the relay.
///
/// Routes: `GET /ws` for the relay protocol, `GET /healthz` for liveness
/// probes.
pub fn router(handle: RelayHandle) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(handle)
}
