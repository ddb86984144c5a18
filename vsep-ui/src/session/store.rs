//! Cookie-keyed session registry

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderValue};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::SessionState;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "vsep_session";

struct SessionEntry {
    state: Arc<Mutex<SessionState>>,
    last_seen: Instant,
}

/// Session lookup result
pub struct SessionHandle {
    pub id: Uuid,
    pub state: Arc<Mutex<SessionState>>,
    /// True when the session was created by this lookup
    pub created: bool,
}

/// All live sessions, each behind its own async mutex
pub struct SessionStore {
    sessions: StdMutex<HashMap<Uuid, SessionEntry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: StdMutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Look up the session for `id`, creating a fresh one when unknown.
    ///
    /// Idle sessions are pruned first; dropping them deletes their files.
    pub fn get_or_create(&self, id: Option<Uuid>) -> SessionHandle {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        self.prune(&mut sessions, now);

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return SessionHandle {
                    id,
                    state: entry.state.clone(),
                    created: false,
                };
            }
        }

        let id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(SessionState::default()));
        sessions.insert(
            id,
            SessionEntry {
                state: state.clone(),
                last_seen: now,
            },
        );
        debug!(session = %id, "Created session");
        SessionHandle {
            id,
            state,
            created: true,
        }
    }

    /// Existing session only; never creates.
    pub fn get(&self, id: Uuid) -> Option<Arc<Mutex<SessionState>>> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        self.prune(&mut sessions, now);
        sessions.get_mut(&id).map(|entry| {
            entry.last_seen = now;
            entry.state.clone()
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(pruned, remaining = sessions.len(), "Pruned idle sessions");
        }
    }
}

/// Session id from the request's `Cookie` headers
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a session id
pub fn session_cookie(id: Uuid) -> HeaderValue {
    // Uuid text is always a valid header value
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, id
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("vsep_session=; Path=/"))
}
