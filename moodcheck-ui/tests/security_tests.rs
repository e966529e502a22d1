//! Dashboard gating and sign-in failure behavior
//!
//! The dashboard must be unreachable without a signed-in teacher session, and
//! sign-in failures must never reveal which part of the credential pair was
//! wrong.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use moodcheck_ui::store::{MemoryArtifactStore, MemoryAuthProvider, MemoryRecordStore};
use moodcheck_ui::{build_router, AppState};

const TEACHER_EMAIL: &str = "teacher@school.kr";
const TEACHER_PASSWORD: &str = "correct-password";

fn setup_app() -> axum::Router {
    let state = AppState::new(
        Arc::new(MemoryArtifactStore::new()),
        Arc::new(MemoryRecordStore::new()),
        Arc::new(MemoryAuthProvider::new(TEACHER_EMAIL, TEACHER_PASSWORD)),
    );
    build_router(state)
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json_with_cookie(uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_dashboard(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/dashboard");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn cookie_of(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_dashboard_rejects_request_without_session() {
    let app = setup_app();

    let response = app.oneshot(get_dashboard(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_rejects_unauthenticated_session() {
    let app = setup_app();

    // Establish a session without signing in
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let cookie = cookie_of(&response);

    let response = app.oneshot(get_dashboard(Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_navigate_to_dashboard_without_login_lands_on_main() {
    let app = setup_app();

    let response = app
        .oneshot(post_json(
            "/api/session/navigate",
            json!({ "target": "teacher_dashboard" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["screen"], "main");
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_login_failures_are_undifferentiated() {
    let app = setup_app();

    // Wrong password
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": TEACHER_EMAIL, "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = extract_json(response.into_body()).await;

    // Unknown email
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "nobody@school.kr", "password": TEACHER_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_email = extract_json(response.into_body()).await;

    // Identical body in both cases; nothing leaks which part was wrong
    assert_eq!(wrong_password, wrong_email);
    assert_eq!(wrong_password["error"]["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_successful_login_reaches_dashboard() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": TEACHER_EMAIL, "password": TEACHER_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = cookie_of(&response);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["screen"], "teacher_dashboard");
    assert_eq!(body["authenticated"], true);

    let response = app.oneshot(get_dashboard(Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_dashboard_access() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": TEACHER_EMAIL, "password": TEACHER_PASSWORD }),
        ))
        .await
        .unwrap();
    let cookie = cookie_of(&response);

    let response = app
        .clone()
        .oneshot(post_json_with_cookie("/api/auth/logout", &cookie, json!({})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["screen"], "main");
    assert_eq!(body["authenticated"], false);

    let response = app.oneshot(get_dashboard(Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
