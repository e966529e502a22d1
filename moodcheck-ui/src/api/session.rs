//! Session and screen-router endpoints
//!
//! The four-screen state machine lives server-side in the session table; the
//! browser asks for transitions and renders whatever screen comes back.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{session_cookie_value, Screen};
use crate::AppState;

/// Session view returned by every session endpoint
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub screen: Screen,
    pub authenticated: bool,
}

/// POST /api/session/navigate request body
#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub target: Screen,
}

/// Attach the session cookie when the session was just created
pub(crate) fn session_response(id: Uuid, created: bool, view: SessionView) -> Response {
    let mut response = Json(view).into_response();
    if created {
        response
            .headers_mut()
            .insert(header::SET_COOKIE, session_cookie_value(id));
    }
    response
}

pub(crate) fn view_of(state: &AppState, id: Uuid) -> SessionView {
    let session = state.sessions.get(id).unwrap_or_default();
    SessionView {
        screen: session.screen,
        authenticated: session.authenticated,
    }
}

/// GET /api/session
///
/// Current screen and authentication flag; creates the session on first
/// contact.
pub async fn current_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = state.sessions.resolve(&headers);
    let view = view_of(&state, id);
    session_response(id, created, view)
}

/// POST /api/session/navigate
///
/// Apply one state-machine transition. Unauthorized attempts to reach the
/// dashboard come back as `main`; disallowed transitions keep the current
/// screen.
pub async fn navigate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NavigateRequest>,
) -> Response {
    let (id, created) = state.sessions.resolve(&headers);
    state
        .sessions
        .update(id, |session| session.navigate(request.target));
    let view = view_of(&state, id);
    session_response(id, created, view)
}
