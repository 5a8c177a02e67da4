// src/server/ws.rs

//! WebSocket endpoint: one session per connection.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::pipeline::ProcessLauncher;
use crate::protocol::decode_command;
use crate::server::AppState;
use crate::session::{OutboundFrame, Session, SessionCore, SessionEvent};

const CONTROL_CHANNEL_CAPACITY: usize = 16;
const OUTBOUND_CHANNEL_CAPACITY: usize = 256;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let id = state.next_session_id();
    info!(session = id, "connection opened");

    let (mut sink, mut stream) = socket.split();
    let (control_tx, control_rx) = mpsc::channel::<SessionEvent>(CONTROL_CHANNEL_CAPACITY);
    let (out_tx, mut out_rx) = mpsc::channel::<OutboundFrame>(OUTBOUND_CHANNEL_CAPACITY);

    let launcher = ProcessLauncher::new(state.commands.clone(), state.runtime.clone());
    let core = SessionCore::new(Arc::clone(&state.allow_list));
    let session = Session::new(id, core, control_rx, launcher, out_tx);
    let gate = session.frame_gate();
    let session_task = tokio::spawn(session.run());

    // Forward encoded events to the socket, skipping frames of killed pipelines.
    let forward_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if !gate.admits(&frame) {
                continue;
            }
            if sink.send(Message::Text(frame.text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => match decode_command(text.as_str()) {
                Ok(Some(command)) => {
                    debug!(session = id, ?command, "received command");
                    if control_tx
                        .send(SessionEvent::CommandReceived(command))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Ok(None) => debug!(session = id, "message carries no command; ignoring"),
                Err(err) => warn!(session = id, error = %err, "malformed message; ignoring"),
            },
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames are not part of the protocol.
            _ => {}
        }
    }

    // Nothing reaches the transport after this point, queued or not.
    forward_task.abort();
    let _ = control_tx.send(SessionEvent::ConnectionClosed).await;
    if let Err(e) = session_task.await {
        warn!(session = id, error = %e, "session task ended abnormally");
    }
    info!(session = id, "connection closed");
}
