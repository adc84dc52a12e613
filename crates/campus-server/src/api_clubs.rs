//! Club registration, login and dashboard.

use crate::api::{with_conn, ApiError};
use crate::middleware::ClubContext;
use crate::AppState;
use axum::extract::{rejection::JsonRejection, Extension, Json};
use campus_auth::{login, register_club, ClubSummary};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Request body for `POST /api/club-register`.
#[derive(Debug, Deserialize)]
pub struct RegisterClubRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for `POST /api/club-login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response body for registration and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClubSessionResponse {
    pub success: bool,
    pub club: ClubSummary,
    /// Bearer token for the authenticated routes.
    pub token: String,
}

/// Handler for `POST /api/club-register`.
pub async fn register_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterClubRequest>, JsonRejection>,
) -> Result<Json<ClubSessionResponse>, ApiError> {
    let Json(payload) = payload?;
    let club = with_conn(&state, move |conn| {
        Ok(register_club(
            conn,
            &payload.name,
            &payload.email,
            &payload.password,
        )?)
    })
    .await?;

    let token = state.tokens.issue(&club)?;
    Ok(Json(ClubSessionResponse {
        success: true,
        club: ClubSummary::from(&club),
        token,
    }))
}

/// Handler for `POST /api/club-login`.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ClubSessionResponse>, ApiError> {
    let Json(payload) = payload?;
    let club = with_conn(&state, move |conn| {
        Ok(login(conn, &payload.email, &payload.password)?)
    })
    .await?;

    let token = state.tokens.issue(&club)?;
    tracing::info!(club_id = club.id, "club logged in");
    Ok(Json(ClubSessionResponse {
        success: true,
        club: ClubSummary::from(&club),
        token,
    }))
}

/// Handler for `GET /api/club-dashboard`.
pub async fn dashboard_handler(Extension(ClubContext(club)): Extension<ClubContext>) -> Json<Value> {
    Json(json!({
        "message": format!("Welcome {}!", club.name),
        "club": {
            "id": club.club_id,
            "name": club.name,
            "email": club.email,
        }
    }))
}
