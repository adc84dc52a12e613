use axum::{
    body::Body,
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use campus_auth::parse_bearer;
use campus_types::{ActorIdentity, AuthRejection, Authorizer};
use std::sync::Arc;

use crate::api::ApiError;
use crate::AppState;

/// The authenticated club, stored in request extensions.
#[derive(Clone, Debug)]
pub struct ClubContext(pub ActorIdentity);

/// Reads the `Authorization` header value, treating non-ASCII as malformed.
pub(crate) fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, AuthRejection> {
    headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthRejection::Malformed))
        .transpose()
}

/// Middleware to authenticate requests via `Authorization: Bearer <token>`.
///
/// The token is verified statelessly; the club is not re-read from the
/// database.
pub async fn auth_middleware(mut req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or_else(|| ApiError::InternalServerError("application state missing".to_string()))?
        .clone();

    let actor = authorization_header(req.headers())
        .and_then(parse_bearer)
        .and_then(|token| state.tokens.verify(token))
        .map_err(|rejection| {
            tracing::debug!(path = %req.uri().path(), %rejection, "request rejected");
            ApiError::from(rejection)
        })?;

    req.extensions_mut().insert(ClubContext(actor));
    Ok(next.run(req).await)
}
