//! moodcheck-ui library - classroom emotion check-in web service
//!
//! One axum service carrying both faces of the tool: the student check-in
//! form (name, emotion, freehand drawing) and the teacher dashboard
//! (aggregated mood statistics plus the drawing gallery).

use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod store;

use session::SessionStore;
use store::{ArtifactStore, AuthProvider, RecordStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Object storage for drawing artifacts
    pub artifacts: Arc<dyn ArtifactStore>,
    /// Append-only check-in collection
    pub records: Arc<dyn RecordStore>,
    /// Identity provider for teacher sign-in
    pub auth: Arc<dyn AuthProvider>,
    /// Per-browser-tab sessions
    pub sessions: SessionStore,
}

impl AppState {
    /// Create new application state over any store backend
    pub fn new(
        artifacts: Arc<dyn ArtifactStore>,
        records: Arc<dyn RecordStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            artifacts,
            records,
            auth,
            sessions: SessionStore::new(),
        }
    }
}

/// Build application router
///
/// The dashboard endpoint sits behind the teacher-session guard; everything
/// else (UI, health, check-in, session, login) is public.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    // Protected routes (require an authenticated teacher session)
    let protected = Router::new()
        .route("/api/dashboard", get(api::get_dashboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::teacher_middleware,
        ));

    // Public routes
    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/session", get(api::current_session))
        .route("/api/session/navigate", post(api::navigate))
        .route("/api/checkin", post(api::submit_checkin))
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/logout", post(api::logout))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
