//! HTTP and WebSocket surface of Campus Live.
//!
//! Public routes serve the live announcement socket, the announcement
//! listing, event and member listings, and student registration. Routes
//! that change a club's data sit behind [`middleware::auth_middleware`],
//! which turns a bearer token into a [`middleware::ClubContext`].

pub mod api;
pub mod api_clubs;
pub mod api_events;
pub mod api_live;
pub mod api_members;
pub mod config;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use campus_auth::TokenService;
use campus_db::DbPool;
use campus_live::LiveService;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler through an `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    /// The live announcement channel. One per process.
    pub live: Arc<LiveService>,
    pub tokens: Arc<TokenService>,
}

const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/club-dashboard", get(api_clubs::dashboard_handler))
        .route("/api/events", post(api_events::create_event_handler))
        .route(
            "/api/events/{id}",
            put(api_events::update_event_handler).delete(api_events::delete_event_handler),
        )
        .route("/api/members", post(api_members::create_member_handler))
        .route("/api/members/{id}", delete(api_members::delete_member_handler))
        .layer(axum::middleware::from_fn(middleware::auth_middleware));

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(api_live::ws_handler))
        .route("/ws/updates", get(api_live::ws_handler))
        .route("/api/add-update", post(api_live::add_update_handler))
        .route(
            "/api/updates",
            get(api_live::list_updates_handler).post(api_live::add_update_handler),
        )
        .route("/api/club-register", post(api_clubs::register_handler))
        .route("/api/club-login", post(api_clubs::login_handler))
        .route("/api/events", get(api_events::list_events_handler))
        .route("/api/events/{id}", get(api_events::get_event_handler))
        .route(
            "/api/events/{id}/register",
            post(api_events::register_attendee_handler),
        )
        .route("/api/members", get(api_members::list_members_handler))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
