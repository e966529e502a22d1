//! HTTP API handlers for moodcheck-ui

pub mod auth;
pub mod checkin;
pub mod dashboard;
pub mod health;
pub mod session;
pub mod ui;

pub use auth::{login, logout, teacher_middleware};
pub use checkin::submit_checkin;
pub use dashboard::get_dashboard;
pub use health::health_routes;
pub use session::{current_session, navigate};
pub use ui::{serve_app_js, serve_index};
