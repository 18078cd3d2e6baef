//! huddle server binary.
//!
//! # Usage
//!
//! ```bash
//! huddle-server --bind 0.0.0.0:3000
//! ```
//!
//! Clients connect with a WebSocket to `ws://<host>/ws` and speak the
//! JSON message catalogue from `huddle-proto`.

use clap::Parser;
use huddle_core::RelayConfig;
use huddle_server::RelayHandle;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// huddle relay server
#[derive(Parser, Debug)]
#[command(name = "huddle-server")]
#[command(about = "Room-code relay server for shared sessions")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("huddle server starting");

    let handle = RelayHandle::spawn(RelayConfig::default());
    let app = huddle_server::router(handle);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
