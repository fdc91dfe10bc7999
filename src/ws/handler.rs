//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::ArenaHandle;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::hub::Frame;
use crate::ws::protocol::{ClientMsg, ConnectionId};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    info!(connection_id = %connection_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();

    // Register before the arena hears about us so the user count includes this connection
    let frames = state.hub.register(connection_id);
    state.arena.connect(connection_id).await;

    run_session(connection_id, ws_sink, ws_stream, frames, &state.arena).await;

    // Cleanup on disconnect
    state.hub.unregister(connection_id);
    state.arena.disconnect(connection_id).await;

    info!(connection_id = %connection_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    connection_id: ConnectionId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: SplitStream<WebSocket>,
    mut frames: mpsc::Receiver<Frame>,
    arena: &ArenaHandle,
) {
    let rate_limiter = ConnectionRateLimiter::new();

    // Spawn writer task: outbound queue -> WebSocket
    let writer_handle = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if let Err(e) = ws_sink.send(Message::Text(frame.to_string())).await {
                debug!(connection_id = %connection_id, error = %e, "WebSocket send failed");
                break;
            }
        }
        debug!(connection_id = %connection_id, "Outbound queue closed");
    });

    // Reader loop: WebSocket -> arena
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(connection_id = %connection_id, "Rate limited input message");
                    continue;
                }

                match ClientMsg::parse(&text) {
                    Ok(msg) => {
                        if matches!(msg, ClientMsg::ChatMessage(_)) && !rate_limiter.check_chat() {
                            warn!(connection_id = %connection_id, "Rate limited chat message");
                            continue;
                        }
                        arena.intent(connection_id, msg).await;
                    }
                    Err(e) => {
                        warn!(connection_id = %connection_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(connection_id = %connection_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                debug!(connection_id = %connection_id, "Received ping/pong");
            }
            Ok(Message::Close(_)) => {
                info!(connection_id = %connection_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Abort writer task
    writer_handle.abort();
}
