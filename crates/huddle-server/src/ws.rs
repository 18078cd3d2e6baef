//! WebSocket endpoint: one upgraded socket per connection.
//!
//! The socket task is pure transport glue. It decodes inbound text frames
//! into [`ClientMessage`]s for the relay actor and writes back the
//! [`ServerMessage`]s the actor pushes into this connection's outbound
//! channel. All relay semantics live behind the actor; a panic can never
//! start here and reach another connection.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use huddle_proto::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;

use crate::actor::{Command, RelayHandle};

/// `GET /ws` upgrade handler.
pub async fn ws_handler(
    State(handle): State<RelayHandle>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, handle))
}

/// Drive one connection until its transport drops.
async fn handle_socket(socket: WebSocket, handle: RelayHandle) {
    let conn = handle.next_conn_id();
    tracing::debug!(%conn, "websocket connected");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    handle.command(Command::Register { conn, outbound: outbound_tx });

    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                tracing::warn!("failed to encode outbound message");
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = stream.next().await {
        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => handle.command(Command::Inbound { conn, message }),
                Err(error) => {
                    tracing::debug!(%conn, %error, "undecodable frame");
                    handle.command(Command::Malformed { conn });
                },
            },
            Message::Close(_) => break,
            // Binary frames are not part of the protocol; control frames
            // are handled by the websocket layer.
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {},
        }
    }

    // The read loop ending, for any reason, is the disconnect signal.
    tracing::debug!(%conn, "websocket disconnected");
    handle.command(Command::Closed { conn });
    writer.abort();
}
