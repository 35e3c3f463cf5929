//! WebSocket Connection Handler
//!
//! Transport plumbing for a single connection: the upgrade, the join
//! handshake with timeout, the writer task, and the read loop that feeds
//! the chat gateway until the socket closes or the connection is kicked.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Notify};
use tokio::time::timeout;
use uuid::Uuid;

use super::events::{ClientEvent, ServerEvent};
use super::gateway::ChatGateway;
use crate::startup::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4().to_string();
    tracing::debug!(conn_id = %conn_id, "New WebSocket connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let kick = Arc::new(Notify::new());

    // Forward queued events to the socket until the channel is drained.
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    // Nothing but `join` is honored before the handshake completes.
    let join_timeout = Duration::from_secs(state.settings.websocket.join_timeout_secs);
    let join = timeout(join_timeout, async {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Ok(ClientEvent::Join { user_id, password }) =
                        serde_json::from_str::<ClientEvent>(&text)
                    {
                        return Some((user_id, password));
                    }
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                _ => continue,
            }
        }
        None
    })
    .await;

    let (user_id, password) = match join {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            tracing::debug!(conn_id = %conn_id, "Connection closed before join");
            drop(tx);
            let _ = writer.await;
            return;
        }
        Err(_) => {
            tracing::debug!(conn_id = %conn_id, "Join timeout");
            drop(tx);
            let _ = writer.await;
            return;
        }
    };

    if !state
        .gateway
        .join(&conn_id, user_id, &password, tx.clone(), kick.clone())
        .await
    {
        // Let the writer flush the terminal error before closing.
        drop(tx);
        let _ = writer.await;
        return;
    }

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => dispatch(&state.gateway, &conn_id, event).await,
                            Err(e) => {
                                tracing::debug!(conn_id = %conn_id, error = %e, "Unparseable frame ignored");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                        break;
                    }
                    Some(Ok(_)) => continue,
                }
            }
            _ = kick.notified() => {
                tracing::debug!(conn_id = %conn_id, "Connection kicked");
                break;
            }
        }
    }

    state.gateway.disconnect(&conn_id).await;
    drop(tx);
    let _ = writer.await;
}

async fn dispatch(gateway: &ChatGateway, conn_id: &str, event: ClientEvent) {
    match event {
        ClientEvent::Join { .. } => {
            tracing::debug!(conn_id = %conn_id, "Duplicate join ignored");
        }
        ClientEvent::JoinTopic { topic_id } => {
            gateway.switch_topic(conn_id, topic_id).await;
        }
        ClientEvent::SendMessage {
            content,
            temp_id,
            topic_id,
        } => {
            gateway.send_message(conn_id, &content, temp_id, topic_id).await;
        }
        ClientEvent::Typing { topic_id } => {
            gateway.typing(conn_id, topic_id);
        }
        ClientEvent::StopTyping { topic_id } => {
            gateway.stop_typing(conn_id, topic_id);
        }
        ClientEvent::DeleteMessage {
            message_id,
            topic_id,
        } => {
            gateway.delete_message(conn_id, message_id, topic_id).await;
        }
        ClientEvent::BanUser { target_id, reason } => {
            gateway.ban_user(conn_id, target_id, reason.as_deref()).await;
        }
        ClientEvent::ClearChat { topic_id } => {
            gateway.clear_topic(conn_id, topic_id).await;
        }
    }
}
