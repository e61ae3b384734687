//! WebSocket endpoint for change notifications.
//!
//! `GET /ws` upgrades to a WebSocket bound to the caller resolved at handshake.
//! The session is server-to-client only: every create, update, or delete of one
//! of the caller's records arrives as a text frame
//! `{"action": "...", "payload": {"tv": {...}}}`. Client frames are read and
//! ignored; a close frame, a read error or a failed write ends the session and
//! unregisters it from the hub.

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use catalog_core::Caller;
use futures::{SinkExt, StreamExt};

use crate::events::NotificationHub;
use crate::extract::CallerIdentity;
use crate::state::AppState;

/// GET /ws
async fn subscribe_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
) -> Response {
    tracing::info!(owner_id = %caller.owner_id(), "WebSocket connection requested");
    let hub = state.hub().clone();
    ws.on_upgrade(move |socket| run_session(socket, hub, caller))
}

async fn run_session(socket: WebSocket, hub: NotificationHub, caller: Caller) {
    let subscription = hub.subscribe(caller.owner_id().clone()).await;
    let connection_id = subscription.id;
    let mut events = subscription.receiver;

    tracing::info!(
        owner_id = %subscription.owner_id,
        connection_id = %connection_id,
        "WebSocket session opened"
    );

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = events.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                // no client-to-server protocol; pings are answered by axum
                _ => tracing::trace!("Ignoring client frame"),
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    hub.unregister(connection_id).await;
    tracing::info!(connection_id = %connection_id, "WebSocket session closed");
}

/// Build WebSocket routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(subscribe_events))
}
