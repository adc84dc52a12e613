//! Event routes. Writes announce themselves on the live channel.

use crate::api::{with_conn, ApiError};
use crate::middleware::ClubContext;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Json, Path,
    },
    http::StatusCode,
};
use campus_records::{
    create_event, delete_event, get_event, list_events, register_attendee, update_event,
    EventPatch, EventRecord, NewEvent, RegistrationInput,
};
use campus_types::ActorIdentity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ANNOUNCE_CREATED: &str = "New event announced";
const ANNOUNCE_UPDATED: &str = "Event updated";
const ANNOUNCE_CANCELLED: &str = "Event cancelled";

/// Response body for a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub success: bool,
    /// Attendee count after this registration.
    pub attendees: i64,
}

/// Publishes an event announcement. The write has already committed, so a
/// failure here is only logged.
async fn announce(state: &AppState, actor: &ActorIdentity, event: &EventRecord, update: &str) {
    if let Err(e) = state.live.publish(actor, &event.title, update).await {
        tracing::warn!(event_id = event.id, "event announcement not published: {}", e);
    }
}

/// Handler for `GET /api/events`. Earliest date first.
pub async fn list_events_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let events = with_conn(&state, |conn| Ok(list_events(conn)?)).await?;
    Ok(Json(events))
}

/// Handler for `GET /api/events/{id}`.
pub async fn get_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<EventRecord>, ApiError> {
    let Path(id) = id?;
    let event = with_conn(&state, move |conn| Ok(get_event(conn, id)?)).await?;
    Ok(Json(event))
}

/// Handler for `POST /api/events`.
pub async fn create_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ClubContext(actor)): Extension<ClubContext>,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<EventRecord>), ApiError> {
    let Json(payload) = payload?;
    let club_id = actor.club_id;
    let event = with_conn(&state, move |conn| Ok(create_event(conn, club_id, &payload)?)).await?;
    announce(&state, &actor, &event, ANNOUNCE_CREATED).await;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Handler for `PUT /api/events/{id}`.
pub async fn update_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ClubContext(actor)): Extension<ClubContext>,
    id: Result<Path<i64>, PathRejection>,
    patch: Result<Json<EventPatch>, JsonRejection>,
) -> Result<Json<EventRecord>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    let club_id = actor.club_id;
    let event = with_conn(&state, move |conn| Ok(update_event(conn, club_id, id, &patch)?)).await?;
    announce(&state, &actor, &event, ANNOUNCE_UPDATED).await;
    Ok(Json(event))
}

/// Handler for `DELETE /api/events/{id}`.
pub async fn delete_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ClubContext(actor)): Extension<ClubContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let club_id = actor.club_id;
    let event = with_conn(&state, move |conn| Ok(delete_event(conn, club_id, id)?)).await?;
    announce(&state, &actor, &event, ANNOUNCE_CANCELLED).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `POST /api/events/{id}/register`. Public.
pub async fn register_attendee_handler(
    Extension(state): Extension<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RegistrationInput>, JsonRejection>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let attendees =
        with_conn(&state, move |conn| Ok(register_attendee(conn, id, &payload)?)).await?;
    Ok(Json(RegistrationResponse {
        success: true,
        attendees,
    }))
}
