//! WebSocket stream of completed ticks

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::{actors::TickEvent, api::state::ApiState};

/// WebSocket upgrade handler
///
/// GET /api/v1/stream
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

async fn handle_websocket(socket: WebSocket, state: ApiState) {
    info!("WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut tick_rx = state.engine.subscribe();

    let mut send_task = tokio::spawn(async move {
        loop {
            match tick_rx.recv().await {
                Ok(TickEvent { point, counts }) => {
                    let json = serde_json::json!({
                        "type": "tick",
                        "point": point,
                        "counts": counts,
                    });

                    if let Ok(text) = serde_json::to_string(&json)
                        && sender.send(Message::Text(text)).await.is_err()
                    {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket client lagged, skipped {skipped} ticks");
                }
                Err(RecvError::Closed) => {
                    debug!("tick channel closed");
                    break;
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!("WebSocket client disconnected");
}
