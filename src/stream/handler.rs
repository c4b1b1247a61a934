//! Live-Update Stream Handler
//!
//! Upgrades an authenticated HTTP request to a WebSocket bound to one
//! device and bridges hub events onto it for the life of the connection.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use super::hub::StreamHub;
use crate::api::AppState;
use crate::auth::AuthSession;

/// GET /api/devices/:id/stream
///
/// The first frame is always the snapshot for the device; every frame after
/// that is a new telemetry record. The subscriber is deregistered as soon as
/// the peer disconnects.
pub async fn stream_handler(
    _session: AuthSession,
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> Response {
    let hub = Arc::clone(&state.hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub, device_id))
}

/// Pump hub events to the peer until either side goes away
async fn handle_socket(socket: WebSocket, hub: Arc<StreamHub>, device_id: String) {
    let (mut sender, mut receiver) = socket.split();

    // Registration also enqueues the snapshot as the first event.
    let (handle, mut rx) = hub.subscribe(&device_id).await;

    let device_for_send = device_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(
                            device = %device_for_send,
                            "stream send failed, closing connection"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize stream event");
                }
            }
        }
    });

    // The stream is one-way; inbound frames are only drained so the close
    // handshake is observed promptly.
    let device_for_recv = device_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    tracing::debug!(device = %device_for_recv, "client closed stream");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(device = %device_for_recv, error = %e, "stream receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unsubscribe(&handle).await;
}
