//! Per-browser session state.
//!
//! A session is identified by a UUID in the `art_session` cookie and holds the user's
//! API keys plus, once generated, the latest report and the image it describes.

use crate::report::{Credentials, Report, UploadedImage};
use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "art_session";
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Where a session is in its two-state flow.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    AwaitingInput,
    ReportReady {
        image: UploadedImage,
        report: Report,
    },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub credentials: Credentials,
    pub state: SessionState,
    last_seen: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            state: SessionState::default(),
            last_seen: Instant::now(),
        }
    }
}

impl Session {
    pub fn report(&self) -> Option<&Report> {
        match &self.state {
            SessionState::ReportReady { report, .. } => Some(report),
            SessionState::AwaitingInput => None,
        }
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        match &self.state {
            SessionState::ReportReady { image, .. } => Some(image),
            SessionState::AwaitingInput => None,
        }
    }

    /// Record a finished report, replacing any earlier one.
    pub fn complete(&mut self, image: UploadedImage, report: Report) {
        self.state = SessionState::ReportReady { image, report };
    }

    /// Nothing worth keeping: no keys and no report.
    pub fn is_blank(&self) -> bool {
        !self.credentials.has_model_key()
            && !self.credentials.has_search_key()
            && matches!(self.state, SessionState::AwaitingInput)
    }
}

/// All live sessions. Locks are only held for the duration of a closure, never across
/// a call to a hosted service.
///
/// Blank sessions are never stored. Sessions idle for longer than `idle_ttl` are
/// evicted, and when `max_sessions` is reached the least recently seen one makes room
/// for a new one.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Inspect a session; unknown ids read as a fresh session. Known sessions count
    /// as seen.
    pub async fn read<F, R>(&self, id: Uuid, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) => {
                session.last_seen = Instant::now();
                f(session)
            }
            None => f(&Session::default()),
        }
    }

    /// Mutate a session. An unknown id is only stored if `f` leaves something in it.
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.get_mut(&id) {
            session.last_seen = now;
            return f(session);
        }

        let mut session = Session::default();
        let result = f(&mut session);
        if !session.is_blank() {
            self.make_room(&mut sessions, now);
            sessions.insert(id, session);
        }
        result
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    /// Drop every session not seen since `now - idle_ttl`. Returns how many went.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_idle_locked(&mut sessions, now)
    }

    fn evict_idle_locked(&self, sessions: &mut HashMap<Uuid, Session>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_duration_since(s.last_seen) < self.idle_ttl);
        before - sessions.len()
    }

    fn make_room(&self, sessions: &mut HashMap<Uuid, Session>, now: Instant) {
        self.evict_idle_locked(sessions, now);
        while sessions.len() >= self.max_sessions {
            let oldest = sessions.iter().min_by_key(|(_, s)| s.last_seen).map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    debug!(session = %id, "Evicting least recently seen session");
                    sessions.remove(&id);
                }
                None => break,
            }
        }
    }

    /// Periodically evict idle sessions in the background.
    pub fn spawn_sweeper(&self, every: Duration) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = store.evict_idle(Instant::now()).await;
                if removed > 0 {
                    let remaining = store.len().await;
                    info!(removed, remaining, "Evicted idle sessions");
                }
            }
        });
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// The caller's session id, minted when the request carries no valid cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId {
    pub id: Uuid,
    pub is_new: bool,
}

impl SessionId {
    /// Attach the session cookie to a response when the id was just minted.
    pub fn attach(self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.is_new {
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.id);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
    SessionStore: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionStore::from_ref(state);

        // Ids the server never issued (or has since evicted) are replaced
        if let Some(id) = session_id_from_headers(&parts.headers) {
            if store.contains(id).await {
                return Ok(SessionId { id, is_new: false });
            }
        }

        Ok(SessionId {
            id: Uuid::new_v4(),
            is_new: true,
        })
    }
}

/// Find the session id among the request's cookies.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
