// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket push channel for the dashboard.
//!
//! Server -> Client (JSON):
//! ```json
//! {"event": "status", "data": {"message": "...", "type": "success"}}
//! {"event": "lead_update", "data": {"id": 1, "chat_source": "...", ...}}
//! ```
//!
//! Client messages are ignored apart from close frames.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::events::DashboardEvent;
use crate::server::GatewayState;

/// Event names sent to dashboard clients.
pub mod event_names {
    /// Connection acknowledgement.
    pub const STATUS: &str = "status";
    /// A lead was found.
    pub const LEAD_UPDATE: &str = "lead_update";
}

/// Renders a pipeline event as a client frame. Only `new_lead` is relayed.
pub fn client_frame(event: &DashboardEvent) -> Option<String> {
    (event.event_type == "new_lead").then(|| {
        serde_json::json!({
            "event": event_names::LEAD_UPDATE,
            "data": event.payload,
        })
        .to_string()
    })
}

fn connected_frame() -> String {
    serde_json::json!({
        "event": event_names::STATUS,
        "data": {"message": "Подключено к серверу", "type": "success"},
    })
    .to_string()
}

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
///
/// A sender task drains this client's queue into the socket while the
/// receive loop waits for the client to go away.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let ws_id = uuid::Uuid::new_v4().to_string();

    let (tx, mut rx) = mpsc::channel::<String>(64);
    if tx.send(connected_frame()).await.is_err() {
        return;
    }
    state.ws_senders.insert(ws_id.clone(), tx);
    tracing::debug!(ws_id = %ws_id, clients = state.ws_senders.len(), "dashboard client connected");

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    state.ws_senders.remove(&ws_id);
    sender_task.abort();
    tracing::debug!(ws_id = %ws_id, "dashboard client disconnected");
}

/// Fans pipeline events out to every connected client until cancelled.
///
/// A client whose queue is full misses the frame; a closed queue is removed.
pub async fn relay_events(
    mut events: broadcast::Receiver<DashboardEvent>,
    clients: Arc<DashMap<String, mpsc::Sender<String>>>,
    shutdown: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = events.recv() => match received {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "dashboard relay lagged behind");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        let Some(frame) = client_frame(&event) else {
            continue;
        };
        clients.retain(|ws_id, tx| match tx.try_send(frame.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(ws_id = %ws_id, "client queue full, frame dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }
}
