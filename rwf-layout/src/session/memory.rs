//! Sessions stored in server memory.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{cookie_name, Session, SessionStore};
use crate::http::{CookieBuilder, Request, Response};
use crate::Error;

/// Keeps sessions in a map on the server. The client only gets the session id,
/// in an encrypted cookie.
///
/// Sessions are lost when the process restarts. Useful for tests and single-process apps.
///
/// Sessions without data aren't stored, and expired sessions are dropped
/// every [`MemoryStore::PURGE_INTERVAL`] writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Session>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    const PREFIX: &'static str = "rwf_sid";

    /// Number of writes between two purges of expired sessions.
    pub const PURGE_INTERVAL: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired sessions.
    pub fn purge(&self) {
        self.sessions.lock().retain(|_, session| !session.expired());
    }
}

impl SessionStore for MemoryStore {
    fn read(&self, group: &str, request: &Request) -> Result<Option<Session>, Error> {
        let name = cookie_name(Self::PREFIX, group);
        let id = match request.cookies().get_private(&name)? {
            Some(cookie) => cookie.value().to_string(),
            None => return Ok(None),
        };

        Ok(self.sessions.lock().get(&id).cloned())
    }

    fn write(&self, group: &str, session: &Session, response: &mut Response) -> Result<(), Error> {
        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % Self::PURGE_INTERVAL == 0 {
            self.purge();
        }

        if session.is_empty() {
            self.sessions.lock().remove(session.id());
            return Ok(());
        }

        self.sessions
            .lock()
            .insert(session.id().to_string(), session.clone());

        response.cookies().add_private(
            CookieBuilder::new()
                .name(cookie_name(Self::PREFIX, group))
                .value(session.id())
                .http_only()
                .build(),
        )?;

        Ok(())
    }
}
