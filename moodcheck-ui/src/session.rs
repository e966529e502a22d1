//! Per-browser-tab session state
//!
//! The UI is a four-screen finite-state router. Each browser tab holds one
//! session, keyed by a uuid cookie, living only in process memory: created on
//! first contact, mutated by navigation and login/logout, gone on restart.

use axum::http::{header, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Session cookie name
pub const SESSION_COOKIE: &str = "moodcheck_session";

/// Sessions untouched this long are eligible for eviction
const SESSION_IDLE_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Idle sweep runs when a new session would push the table past this size
const SWEEP_THRESHOLD: usize = 512;

/// UI screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Main,
    Student,
    TeacherLogin,
    TeacherDashboard,
}

/// One browser tab's ephemeral state
#[derive(Debug, Clone)]
pub struct Session {
    pub screen: Screen,
    pub authenticated: bool,
    pub id_token: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            screen: Screen::Main,
            authenticated: false,
            id_token: None,
        }
    }
}

impl Session {
    /// Apply a navigation action. Disallowed transitions keep the current
    /// screen; reaching the dashboard without the authenticated flag lands on
    /// `Main` instead.
    pub fn navigate(&mut self, target: Screen) -> Screen {
        use Screen::*;

        let next = match (self.screen, target) {
            (Main, Student) => Student,
            (Main, TeacherLogin) => TeacherLogin,
            (Student, Main) => Main,
            (TeacherLogin, Main) => Main,
            (TeacherDashboard, Main) => Main,
            (_, TeacherDashboard) => {
                if self.authenticated {
                    TeacherDashboard
                } else {
                    Main
                }
            }
            (current, _) => current,
        };

        self.screen = next;
        next
    }

    /// Successful sign-in: set the flag, keep the token, land on the dashboard
    pub fn login(&mut self, id_token: String) {
        self.authenticated = true;
        self.id_token = Some(id_token);
        self.screen = Screen::TeacherDashboard;
    }

    /// Logout clears the flag and token and returns to the main screen
    pub fn logout(&mut self) {
        self.authenticated = false;
        self.id_token = None;
        self.screen = Screen::Main;
    }
}

/// One session plus the last time its cookie was presented
#[derive(Debug, Clone)]
struct SessionEntry {
    session: Session,
    last_seen: Instant,
}

/// In-memory session table shared across HTTP handlers
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

/// Drop entries idle longer than `ttl`
fn sweep_idle(sessions: &mut HashMap<Uuid, SessionEntry>, ttl: Duration) {
    sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session id from the request cookie, creating a fresh
    /// session when the cookie is missing or stale. The bool reports whether
    /// a new session was created (caller must set the cookie).
    pub fn resolve(&self, headers: &HeaderMap) -> (Uuid, bool) {
        if let Some(id) = session_id_from_headers(headers) {
            let mut sessions = self.inner.write().unwrap();
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = Instant::now();
                return (id, false);
            }
        }

        let id = Uuid::new_v4();
        let mut sessions = self.inner.write().unwrap();
        // The table only grows otherwise; shed abandoned sessions before
        // admitting another one
        if sessions.len() >= SWEEP_THRESHOLD {
            sweep_idle(&mut sessions, SESSION_IDLE_TTL);
        }
        sessions.insert(
            id,
            SessionEntry {
                session: Session::default(),
                last_seen: Instant::now(),
            },
        );
        (id, true)
    }

    /// Snapshot of a session's state
    pub fn get(&self, id: Uuid) -> Option<Session> {
        self.inner
            .read()
            .unwrap()
            .get(&id)
            .map(|entry| entry.session.clone())
    }

    /// Mutate a session under the lock
    pub fn update<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        self.inner
            .write()
            .unwrap()
            .get_mut(&id)
            .map(|entry| f(&mut entry.session))
    }
}

/// Extract the session uuid from the Cookie header
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Uuid::parse_str(value).ok()
        } else {
            None
        }
    })
}

/// Set-Cookie value for a freshly created session
pub fn session_cookie_value(id: Uuid) -> HeaderValue {
    // Session cookie (no Max-Age): gone when the tab's browsing session ends
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, id
    ))
    .expect("session cookie is always valid header text")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_main() {
        let session = Session::default();
        assert_eq!(session.screen, Screen::Main);
        assert!(!session.authenticated);
    }

    #[test]
    fn test_student_round_trip() {
        let mut session = Session::default();
        assert_eq!(session.navigate(Screen::Student), Screen::Student);
        assert_eq!(session.navigate(Screen::Main), Screen::Main);
    }

    #[test]
    fn test_teacher_login_back_action() {
        let mut session = Session::default();
        assert_eq!(session.navigate(Screen::TeacherLogin), Screen::TeacherLogin);
        assert_eq!(session.navigate(Screen::Main), Screen::Main);
    }

    #[test]
    fn test_dashboard_requires_authentication() {
        let mut session = Session::default();
        session.navigate(Screen::TeacherLogin);

        // Guard: unauthenticated attempts land back on Main
        assert_eq!(session.navigate(Screen::TeacherDashboard), Screen::Main);
        assert_eq!(session.screen, Screen::Main);
    }

    #[test]
    fn test_login_reaches_dashboard_and_logout_clears() {
        let mut session = Session::default();
        session.navigate(Screen::TeacherLogin);
        session.login("token-1".to_string());

        assert_eq!(session.screen, Screen::TeacherDashboard);
        assert!(session.authenticated);
        assert_eq!(session.id_token.as_deref(), Some("token-1"));

        session.logout();
        assert_eq!(session.screen, Screen::Main);
        assert!(!session.authenticated);
        assert!(session.id_token.is_none());
    }

    #[test]
    fn test_disallowed_transition_keeps_screen() {
        let mut session = Session::default();
        session.navigate(Screen::Student);

        // Student screen has no edge to teacher login
        assert_eq!(session.navigate(Screen::TeacherLogin), Screen::Student);
    }

    #[test]
    fn test_cookie_round_trip() {
        let store = SessionStore::new();
        let (id, created) = store.resolve(&HeaderMap::new());
        assert!(created);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("other=1; {}={}", SESSION_COOKIE, id)).unwrap(),
        );

        let (resolved, created) = store.resolve(&headers);
        assert_eq!(resolved, id);
        assert!(!created);
    }

    #[test]
    fn test_idle_sessions_are_swept() {
        let store = SessionStore::new();
        let (id, _) = store.resolve(&HeaderMap::new());
        store.resolve(&HeaderMap::new());

        {
            let mut sessions = store.inner.write().unwrap();
            assert_eq!(sessions.len(), 2);

            // Fresh sessions survive a sweep at the configured idle limit
            sweep_idle(&mut sessions, SESSION_IDLE_TTL);
            assert_eq!(sessions.len(), 2);

            // A zero limit makes every session idle
            sweep_idle(&mut sessions, Duration::ZERO);
            assert!(sessions.is_empty());
        }

        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_stale_cookie_gets_new_session() {
        let store = SessionStore::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, Uuid::new_v4())).unwrap(),
        );

        let (_, created) = store.resolve(&headers);
        assert!(created);
    }
}
