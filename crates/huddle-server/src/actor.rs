//! The relay actor: single owner of the driver and all outbound senders.
//!
//! Every room and registry mutation flows through one task, so operations
//! on a room are linearized without locks, and the action stream produced
//! by the driver is executed in exactly the order it was accepted.
//! Connection tasks talk to the actor over an mpsc channel and receive
//! server messages over their own per-connection channel.
//!
//! Fan-out is best-effort: a recipient whose channel has closed is logged
//! and skipped, and delivery to the remaining recipients proceeds.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use huddle_core::{ConnId, RelayAction, RelayConfig, RelayDriver, RelayEvent};
use huddle_proto::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;

use crate::system_env::SystemEnv;

/// Commands a connection task sends to the relay actor.
#[derive(Debug)]
pub enum Command {
    /// A connection came up; deliver its messages through `outbound`.
    Register {
        /// The new connection.
        conn: ConnId,
        /// Channel the actor will push server messages into.
        outbound: mpsc::UnboundedSender<ServerMessage>,
    },

    /// A decoded message arrived from a connection.
    Inbound {
        /// The sending connection.
        conn: ConnId,
        /// The decoded message.
        message: ClientMessage,
    },

    /// A frame arrived that did not decode as any known message.
    Malformed {
        /// The sending connection.
        conn: ConnId,
    },

    /// The connection's transport dropped.
    Closed {
        /// The closed connection.
        conn: ConnId,
    },
}

/// Cloneable handle to the relay actor.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    commands: mpsc::UnboundedSender<Command>,
    next_conn: Arc<AtomicU64>,
}

impl RelayHandle {
    /// Spawn the relay actor and return a handle to it.
    pub fn spawn(config: RelayConfig) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let driver = RelayDriver::new(SystemEnv::new(), config);
        tokio::spawn(run(driver, inbox));
        Self { commands, next_conn: Arc::new(AtomicU64::new(1)) }
    }

    /// Allocate a fresh connection handle; never reused in-process.
    pub fn next_conn_id(&self) -> ConnId {
        ConnId::new(self.next_conn.fetch_add(1, Ordering::Relaxed))
    }

    /// Enqueue a command for the actor.
    ///
    /// A send failure means the actor is gone, which only happens at
    /// shutdown; connection tasks just wind down in that case.
    pub fn command(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("relay actor is gone, dropping command");
        }
    }
}

/// The actor loop: owns the driver and the outbound channel map.
async fn run(mut driver: RelayDriver<SystemEnv>, mut inbox: mpsc::UnboundedReceiver<Command>) {
    let mut outbound: HashMap<ConnId, mpsc::UnboundedSender<ServerMessage>> = HashMap::new();

    while let Some(command) = inbox.recv().await {
        match command {
            Command::Register { conn, outbound: sender } => {
                outbound.insert(conn, sender);
            },
            Command::Inbound { conn, message } => {
                let actions = driver.process_event(RelayEvent::MessageReceived { conn, message });
                execute(&outbound, actions);
            },
            Command::Malformed { conn } => {
                deliver(&outbound, conn, &ServerMessage::RequestFailed {
                    reason: "malformed message".to_string(),
                });
            },
            Command::Closed { conn } => {
                let actions = driver.process_event(RelayEvent::ConnectionClosed { conn });
                execute(&outbound, actions);
                outbound.remove(&conn);
            },
        }
    }

    tracing::info!("relay actor shutting down");
}

/// Execute driver actions against the outbound channel map.
fn execute(outbound: &HashMap<ConnId, mpsc::UnboundedSender<ServerMessage>>, actions: Vec<RelayAction>) {
    for action in actions {
        match action {
            RelayAction::Send { conn, message } => deliver(outbound, conn, &message),
            RelayAction::Broadcast { recipients, message } => {
                for conn in recipients {
                    deliver(outbound, conn, &message);
                }
            },
        }
    }
}

/// Push one message into a connection's outbound channel, best-effort.
fn deliver(
    outbound: &HashMap<ConnId, mpsc::UnboundedSender<ServerMessage>>,
    conn: ConnId,
    message: &ServerMessage,
) {
    let Some(sender) = outbound.get(&conn) else {
        tracing::debug!(%conn, "delivery target has no outbound channel");
        return;
    };
    if sender.send(message.clone()).is_err() {
        tracing::debug!(%conn, "delivery target hung up mid-send");
    }
}
