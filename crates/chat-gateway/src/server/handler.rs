//! WebSocket handler
//!
//! Each socket gets two tasks: one reads client frames and dispatches them,
//! the other drains the connection's outbound queue into the socket. When
//! either ends the connection is removed from the registry.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::connection::{generate_session_id, Connection};
use crate::handlers::{MessageDispatcher, PresenceHandler};
use crate::protocol::{ClientMessage, ServerEvent};
use crate::server::GatewayState;

/// WebSocket upgrade endpoint
pub async fn socket_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let session_id = generate_session_id();

    let (tx, mut rx) = mpsc::channel::<ServerEvent>(state.config().buffer_size.max(1));
    let connection = state.registry().add_connection(session_id.clone(), tx);

    tracing::info!(session_id = %session_id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    let state_recv = state.clone();
    let session_id_recv = session_id.clone();
    let connection_recv = connection.clone();

    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    handle_text_message(&state_recv, &connection_recv, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        session_id = %session_id_recv,
                        "Binary frame ignored"
                    );
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Pong is handled automatically by axum
                    tracing::trace!(session_id = %session_id_recv, "Control frame received");
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %session_id_recv, "Client closed connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %session_id_recv,
                        error = %e,
                        "WebSocket error"
                    );
                    break;
                }
            }
        }
    });

    let session_id_send = session_id.clone();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match msg.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!(session_id = %session_id_send, error = %e, "Failed to encode payload");
                    continue;
                }
            };
            if ws_sink.send(Message::Text(json)).await.is_err() {
                tracing::debug!(
                    session_id = %session_id_send,
                    "Failed to send message to WebSocket"
                );
                break;
            }
        }

        let _ = ws_sink.close().await;
    });

    let recv_abort = recv_task.abort_handle();
    let send_abort = send_task.abort_handle();

    tokio::select! {
        _ = recv_task => {
            tracing::debug!(session_id = %session_id, "Receive task ended");
            send_abort.abort();
        }
        _ = send_task => {
            tracing::debug!(session_id = %session_id, "Send task ended");
            recv_abort.abort();
        }
    }

    cleanup_connection(&state, &session_id).await;
}

/// Parse and dispatch one text frame; failures are logged, never fatal
async fn handle_text_message(state: &GatewayState, connection: &Arc<Connection>, text: &str) {
    let result = match ClientMessage::from_json(text) {
        Ok(message) => {
            tracing::trace!(
                session_id = %connection.session_id(),
                method = message.method(),
                "Received message"
            );
            MessageDispatcher::dispatch(state, connection, message).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        if e.is_client_error() {
            tracing::debug!(session_id = %connection.session_id(), error = %e, "Ignoring client message");
        } else {
            tracing::warn!(session_id = %connection.session_id(), error = %e, "Handler error");
        }
    }
}

/// Drop the connection and take its profile offline if nothing else holds it
async fn cleanup_connection(state: &GatewayState, session_id: &str) {
    tracing::info!(session_id = %session_id, "Cleaning up connection");

    if let Some(identity) = state.registry().remove_connection(session_id).await {
        PresenceHandler::mark_offline(state, identity).await;
    }
}
