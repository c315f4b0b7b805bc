//! Per-visitor sessions, keyed by a cookie.
//!
//! Each visitor owns exactly one [`Session`]; requests for different visitors
//! never see each other's contracts or fixed income.

use crate::config::SessionConfig;
use apportion_calculator::Session;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};
use tracing::{debug, info};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "apportion_session";

#[derive(Debug)]
struct SessionEntry {
    session: Session,
    last_seen: DateTime<Utc>,
}

type SharedEntry = Arc<Mutex<SessionEntry>>;

/// How often idle sessions are swept out of the map.
const SWEEP_INTERVAL_SECONDS: i64 = 60;

/// Sessions by id. The map lock is held only to look a session up; the work
/// on a session runs under that session's own mutex, so a large upload in one
/// session does not stall the others.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SharedEntry>>,
    last_sweep: Mutex<DateTime<Utc>>,
    idle_timeout: Duration,
    retain_fixed_income: bool,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            last_sweep: Mutex::new(Utc::now()),
            idle_timeout: Duration::minutes(config.idle_timeout_minutes.max(1)),
            retain_fixed_income: config.retain_fixed_income_on_upload,
        }
    }

    /// Runs `f` against the session for `id`, creating it on first use.
    ///
    /// A session idle for longer than the configured timeout starts over.
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> R {
        self.sweep_idle();
        let entry = {
            let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
            let entry = sessions.entry(id.to_string()).or_insert_with(|| {
                debug!(session_id = id, "creating session");
                Arc::new(Mutex::new(SessionEntry { session: self.fresh(), last_seen: Utc::now() }))
            });
            Arc::clone(entry)
        };

        let mut entry = lock_entry(&entry);
        self.touch(&mut entry);
        f(&mut entry.session)
    }

    /// Runs `f` against the session for `id` without creating one: an unknown
    /// id sees an empty session that is not stored.
    pub fn read_session<R>(&self, id: &str, f: impl FnOnce(&Session) -> R) -> R {
        self.sweep_idle();
        let entry = self.sessions.read().unwrap_or_else(PoisonError::into_inner).get(id).cloned();

        match entry {
            Some(entry) => {
                let mut entry = lock_entry(&entry);
                self.touch(&mut entry);
                f(&entry.session)
            }
            None => f(&self.fresh()),
        }
    }

    /// Drops the session for `id`, if any.
    pub fn remove(&self, id: &str) -> bool {
        let removed =
            self.sessions.write().unwrap_or_else(PoisonError::into_inner).remove(id).is_some();
        if removed {
            info!(session_id = id, "removed session");
        }
        removed
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn fresh(&self) -> Session {
        Session::with_retention(self.retain_fixed_income)
    }

    fn touch(&self, entry: &mut SessionEntry) {
        let now = Utc::now();
        if now - entry.last_seen > self.idle_timeout {
            debug!("session expired, starting over");
            entry.session = self.fresh();
        }
        entry.last_seen = now;
    }

    /// Removes idle sessions, at most once per sweep interval. Sessions busy
    /// with a request are never idle and are skipped.
    fn sweep_idle(&self) {
        let now = Utc::now();
        {
            let mut last_sweep = self.last_sweep.lock().unwrap_or_else(PoisonError::into_inner);
            if now - *last_sweep < Duration::seconds(SWEEP_INTERVAL_SECONDS) {
                return;
            }
            *last_sweep = now;
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, entry| match entry.try_lock() {
            Ok(entry) => now - entry.last_seen <= self.idle_timeout,
            Err(TryLockError::Poisoned(poisoned)) => {
                now - poisoned.into_inner().last_seen <= self.idle_timeout
            }
            Err(TryLockError::WouldBlock) => true,
        });
        if sessions.len() < before {
            info!(evicted = before - sessions.len(), "evicted idle sessions");
        }
    }
}

fn lock_entry(entry: &SharedEntry) -> MutexGuard<'_, SessionEntry> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The visitor's session id, read from the cookie or freshly minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    pub id: String,
    pub is_new: bool,
}

impl SessionId {
    fn from_headers(headers: &HeaderMap) -> Self {
        match cookie_value(headers, SESSION_COOKIE).filter(|v| Uuid::parse_str(v).is_ok()) {
            Some(id) => Self { id, is_new: false },
            None => Self { id: Uuid::new_v4().to_string(), is_new: true },
        }
    }

    /// Attaches the session cookie to `response` when the id was just minted.
    pub fn attach(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.is_new {
            let cookie = format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apportion_types::ContractRecord;

    fn store() -> SessionStore {
        SessionStore::new(&SessionConfig::default())
    }

    #[test]
    fn sessions_are_isolated() {
        let store = store();
        store.with_session("a", |s| s.load_contracts(vec![ContractRecord::new("ana", "1", 1.0)], 0));

        assert!(store.with_session("a", |s| s.has_contracts()));
        assert!(!store.with_session("b", |s| s.has_contracts()));
        assert_eq!(store.active_sessions(), 2);
    }

    #[test]
    fn remove_forgets_the_session() {
        let store = store();
        store.with_session("a", |s| s.load_contracts(vec![ContractRecord::new("ana", "1", 1.0)], 0));
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(!store.with_session("a", |s| s.has_contracts()));
    }

    #[test]
    fn reading_an_unknown_session_stores_nothing() {
        let store = store();
        assert!(!store.read_session("a", |s| s.has_contracts()));
        assert_eq!(store.active_sessions(), 0);

        store.with_session("a", |s| s.load_contracts(vec![ContractRecord::new("ana", "1", 1.0)], 0));
        assert!(store.read_session("a", |s| s.has_contracts()));
        assert_eq!(store.active_sessions(), 1);
    }

    #[test]
    fn a_busy_session_does_not_block_others() {
        let store = Arc::new(store());
        store.with_session("a", |s| s.load_contracts(vec![ContractRecord::new("ana", "1", 1.0)], 0));

        store.with_session("a", |_| {
            let other = Arc::clone(&store);
            let seen = std::thread::spawn(move || {
                other.with_session("b", |s| s.load_contracts(vec![ContractRecord::new("bia", "2", 2.0)], 0));
                other.read_session("b", |s| s.salespeople())
            })
            .join()
            .unwrap();
            assert_eq!(seen, vec!["bia"]);
        });
    }

    #[test]
    fn idle_sessions_start_over() {
        let store = store();
        store.with_session("a", |s| s.load_contracts(vec![ContractRecord::new("ana", "1", 1.0)], 0));
        {
            let sessions = store.sessions.read().unwrap();
            lock_entry(&sessions["a"]).last_seen = Utc::now() - Duration::hours(24);
        }
        assert!(!store.read_session("a", |s| s.has_contracts()));
    }

    #[test]
    fn reads_the_session_cookie() {
        let id = Uuid::new_v4().to_string();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}")).unwrap(),
        );
        assert_eq!(SessionId::from_headers(&headers), SessionId { id, is_new: false });
    }

    #[test]
    fn mints_an_id_for_missing_or_forged_cookies() {
        assert!(SessionId::from_headers(&HeaderMap::new()).is_new);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("apportion_session=../../etc"));
        let session = SessionId::from_headers(&headers);
        assert!(session.is_new);
        assert!(Uuid::parse_str(&session.id).is_ok());
    }

    #[test]
    fn new_ids_set_a_cookie() {
        let session = SessionId::from_headers(&HeaderMap::new());
        let response = session.attach("ok");
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={}", session.id)));

        let existing = SessionId { id: session.id.clone(), is_new: false };
        assert!(existing.attach("ok").headers().get(SET_COOKIE).is_none());
    }
}
