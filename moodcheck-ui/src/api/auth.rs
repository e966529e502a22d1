//! Teacher sign-in, logout, and the dashboard guard

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::session::{session_response, view_of};
use crate::error::ApiError;
use crate::session::session_id_from_headers;
use crate::AppState;

/// POST /api/auth/login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// Delegates credential verification to the identity provider. On success the
/// session gains the authenticated flag and lands on the dashboard screen. On
/// failure the response carries one undifferentiated message, whatever the
/// true cause.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (id, created) = state.sessions.resolve(&headers);

    let token = state
        .auth
        .sign_in(&request.email, &request.password)
        .await?;

    state.sessions.update(id, |session| session.login(token));
    info!("Teacher signed in");

    Ok(session_response(id, created, view_of(&state, id)))
}

/// POST /api/auth/logout
///
/// Clears the authenticated flag and token and returns to the main screen.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = state.sessions.resolve(&headers);
    state.sessions.update(id, |session| session.logout());
    session_response(id, created, view_of(&state, id))
}

/// Guard for teacher-only endpoints.
///
/// Requests without an authenticated session get 401; the UI reacts by
/// routing the screen back to `main`.
pub async fn teacher_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authenticated = session_id_from_headers(request.headers())
        .and_then(|id| state.sessions.get(id))
        .map(|session| session.authenticated)
        .unwrap_or(false);

    if !authenticated {
        return Err(ApiError::Unauthorized("Teacher sign-in required".into()));
    }

    Ok(next.run(request).await)
}
