//! The live announcement channel over HTTP and WebSocket.
//!
//! `GET /ws` attaches an observer: the socket first receives a snapshot
//! frame, then one increment frame per publish. Anything the observer
//! sends is ignored apart from close. `POST /api/add-update` is the
//! authenticated ingress.

use crate::api::ApiError;
use crate::middleware::authorization_header;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, Extension, Json, Query,
    },
    http::HeaderMap,
    response::IntoResponse,
};
use campus_auth::parse_bearer;
use campus_live::Subscription;
use campus_types::{AnnouncementRecord, AuthRejection, Authorizer};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Request body for `POST /api/add-update`.
#[derive(Debug, Deserialize)]
pub struct AddUpdateRequest {
    #[serde(default)]
    pub event: String,
    /// Accepted as `message` too.
    #[serde(default, alias = "message")]
    pub update: String,
}

/// Query parameters for `GET /api/updates`.
#[derive(Debug, Deserialize)]
pub struct UpdatesQuery {
    /// Only return records with an id greater than this.
    pub since: Option<u64>,
}

/// Handler for `GET /ws` and `GET /ws/updates`.
///
/// The channel itself is unauthenticated.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, addr: SocketAddr) {
    let Subscription { id, mut frames } = match state.live.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::error!(remote_addr = %addr, "failed to attach live observer: {}", e);
            return;
        }
    };
    tracing::debug!(connection_id = %id, remote_addr = %addr, "live socket open");

    let (mut sender, mut receiver) = socket.split();

    // Forward queued frames in FIFO order. Socket writes stay outside the
    // sequencer lock. The queue ends when the hub drops a slow observer;
    // the socket is then closed so the client can resubscribe.
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        tracing::debug!(connection_id = %id, "live queue ended, closing socket");
        let _ = sender.send(Message::Close(None)).await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    tracing::debug!(connection_id = %id, len = text.len(), "ignoring inbound text on live socket");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(connection_id = %id, "live socket read error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.live.unsubscribe(id).await;
    tracing::debug!(connection_id = %id, remote_addr = %addr, "live socket closed");
}

/// Handler for `POST /api/add-update` (alias `POST /api/updates`).
///
/// Authorization is checked before the body is looked at.
pub async fn add_update_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<AddUpdateRequest>, JsonRejection>,
) -> Result<Json<AnnouncementRecord>, ApiError> {
    let token = authorization_header(&headers).and_then(parse_bearer);

    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            // A bad credential is reported ahead of a bad body.
            state.tokens.verify(token?)?;
            return Err(rejection.into());
        }
    };

    let token = match token {
        Ok(token) => Some(token),
        Err(AuthRejection::Missing) => None,
        Err(rejection) => return Err(rejection.into()),
    };

    let record = state
        .live
        .publish_with_token(
            state.tokens.as_ref(),
            token,
            &payload.event,
            &payload.update,
        )
        .await?;
    Ok(Json(record))
}

/// Handler for `GET /api/updates`. Oldest first.
pub async fn list_updates_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<UpdatesQuery>, QueryRejection>,
) -> Result<Json<Vec<AnnouncementRecord>>, ApiError> {
    let Query(query) = query?;
    let records = match query.since {
        Some(after) => state.live.since(after).await,
        None => state.live.snapshot().await,
    };
    Ok(Json(records))
}
