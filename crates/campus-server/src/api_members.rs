//! Member roster routes.

use crate::api::{with_conn, ApiError};
use crate::middleware::ClubContext;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Json, Path, Query,
    },
    http::StatusCode,
};
use campus_records::{create_member, delete_member, list_members, MemberRecord, NewMember};
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters for `GET /api/members`.
#[derive(Debug, Deserialize)]
pub struct MembersQuery {
    /// Restrict the listing to one club.
    pub club_id: Option<i64>,
}

/// Handler for `GET /api/members`.
pub async fn list_members_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<MembersQuery>, QueryRejection>,
) -> Result<Json<Vec<MemberRecord>>, ApiError> {
    let Query(query) = query?;
    let members = with_conn(&state, move |conn| Ok(list_members(conn, query.club_id)?)).await?;
    Ok(Json(members))
}

/// Handler for `POST /api/members`.
pub async fn create_member_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ClubContext(actor)): Extension<ClubContext>,
    payload: Result<Json<NewMember>, JsonRejection>,
) -> Result<(StatusCode, Json<MemberRecord>), ApiError> {
    let Json(payload) = payload?;
    let club_id = actor.club_id;
    let member = with_conn(&state, move |conn| Ok(create_member(conn, club_id, &payload)?)).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Handler for `DELETE /api/members/{id}`.
pub async fn delete_member_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ClubContext(actor)): Extension<ClubContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let club_id = actor.club_id;
    with_conn(&state, move |conn| Ok(delete_member(conn, club_id, id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
