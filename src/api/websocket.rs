//! WebSocket fan-out of live events.
//!
//! Clients connect with `GET /ws?token=<bearer token>`; each event is
//! pushed as one JSON text frame. The socket is advisory only: clients
//! re-fetch through the REST API when woken, so a dropped frame costs
//! nothing but latency.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::api::error::ApiError;
use crate::auth::Actor;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
) -> Response {
    let actor: Actor = {
        let sessions = match state.sessions.read() {
            Ok(sessions) => sessions,
            Err(_) => return ApiError::Unauthorized.into_response(),
        };
        match sessions.resolve(&query.token) {
            Some(actor) => actor.clone(),
            None => return ApiError::Unauthorized.into_response(),
        }
    };

    ws.on_upgrade(move |socket| handle_ws(socket, state, actor))
}

async fn handle_ws(socket: WebSocket, state: AppState, actor: Actor) {
    tracing::info!(user = %actor.id, role = actor.role.as_str(), "websocket connected");
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.events.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let Ok(payload) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                // skipped events are fine, the client re-fetches anyway
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(user = %actor.id, skipped, "websocket receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // inbound traffic is ignored, the socket is push-only
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!(user = %actor.id, "websocket disconnected");
}
