//! WebSocket telemetry channel
//!
//! Each client gets the current frame on connect, then every frame the
//! [`TelemetryHub`](crate::telemetry::TelemetryHub) publishes. Client
//! messages are read and discarded.

use crate::api::AppState;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// Upgrade to a telemetry WebSocket.
///
/// # Endpoint
///
/// `GET /ws`
pub(crate) async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    debug!("Request: GET /ws");
    ws.on_upgrade(move |socket| client_session(socket, state))
}

async fn client_session(mut socket: WebSocket, state: AppState) {
    let mut frames = state.telemetry.subscribe();
    debug!("Telemetry client connected");

    if let Some(frame) = state.telemetry.current_frame() {
        if socket.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(text) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Telemetry client lagging, skipped {} frame(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("Telemetry client disconnected");
}
