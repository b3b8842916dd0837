//! Sessions, key/value data that follows a client from one request to the next.
//!
//! Sessions are organized in groups, each backed by a [`SessionStore`]. The `"default"` group
//! keeps the whole session in an encrypted cookie ([`CookieStore`]); other groups can be
//! registered, e.g. a server-side [`MemoryStore`].
//!
//! [`Sessions`] is created for each request. It loads groups when they're first used
//! and saves them into the response once the request is handled.
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::debug;

use crate::colors::MaybeColorize;
use crate::config::get_config;
use crate::http::{Request, Response};
use crate::Error;

pub mod cookie;
pub mod memory;

pub use cookie::CookieStore;
pub use memory::MemoryStore;

/// Name of the session group used when none is specified.
pub const DEFAULT_GROUP: &str = "default";

static STORES: Lazy<SessionStores> = Lazy::new(SessionStores::default);

/// A client's session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    /// Random session identifier.
    #[serde(rename = "i")]
    id: String,
    /// Session data.
    #[serde(rename = "p")]
    payload: Map<String, Value>,
    /// Session expiration (UNIX timestamp in UTC).
    #[serde(rename = "e")]
    expiration: i64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a new empty session.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload: Map::new(),
            expiration: Self::expires_at(),
        }
    }

    fn expires_at() -> i64 {
        (OffsetDateTime::now_utc() + get_config().general.session_duration()).unix_timestamp()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expiration(&self) -> i64 {
        self.expiration
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<(), Error> {
        self.payload
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.payload.remove(key)
    }

    /// All session data.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.payload
    }

    /// Mutable map stored under `key`. If the key is missing or doesn't hold a map,
    /// it's replaced with an empty one.
    pub fn slot(&mut self, key: &str) -> &mut Map<String, Value> {
        let entry = self
            .payload
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }

        match entry {
            Value::Object(map) => map,
            _ => unreachable!("session slot was just set to a map"),
        }
    }

    /// The session holds no data: every value is null or an empty map or list.
    pub fn is_empty(&self) -> bool {
        self.payload.values().all(|value| match value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(list) => list.is_empty(),
            _ => false,
        })
    }

    /// Push the expiration forward by the configured session duration.
    pub fn renew(&mut self) {
        self.expiration = Self::expires_at();
    }

    /// Check if the session has expired.
    pub fn expired(&self) -> bool {
        match OffsetDateTime::from_unix_timestamp(self.expiration) {
            Ok(expiration) => expiration < OffsetDateTime::now_utc(),
            Err(_) => true,
        }
    }
}

/// Storage backend for a session group.
pub trait SessionStore: Send + Sync {
    /// Load the session the client sent with the request, if any.
    fn read(&self, group: &str, request: &Request) -> Result<Option<Session>, Error>;

    /// Persist the session, adding whatever cookie the client needs to the response.
    fn write(&self, group: &str, session: &Session, response: &mut Response) -> Result<(), Error>;
}

/// Session groups and their storage backends.
#[derive(Clone)]
pub struct SessionStores {
    stores: HashMap<String, Arc<dyn SessionStore>>,
}

impl Default for SessionStores {
    /// The `"default"` group, stored in an encrypted cookie.
    fn default() -> Self {
        Self::empty().group(DEFAULT_GROUP, CookieStore)
    }
}

impl SessionStores {
    /// No session groups at all.
    pub fn empty() -> Self {
        Self {
            stores: HashMap::new(),
        }
    }

    /// Shared default session groups.
    pub fn global() -> SessionStores {
        STORES.clone()
    }

    /// Add or replace a session group.
    pub fn group(mut self, name: &str, store: impl SessionStore + 'static) -> Self {
        self.stores.insert(name.to_string(), Arc::new(store));
        self
    }

    /// Add or replace a session group with a store that's shared elsewhere.
    pub fn shared_group(mut self, name: &str, store: Arc<dyn SessionStore>) -> Self {
        self.stores.insert(name.to_string(), store);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SessionStore>> {
        self.stores.get(name).cloned()
    }
}

/// Sessions used while handling a single request.
pub struct Sessions {
    request: Request,
    stores: SessionStores,
    loaded: BTreeMap<String, Session>,
    // Flash data readable during this request, by session group and key.
    flash: BTreeMap<(String, String), Map<String, Value>>,
}

impl Sessions {
    pub fn new(request: &Request, stores: SessionStores) -> Self {
        Self {
            request: request.clone(),
            stores,
            loaded: BTreeMap::new(),
            flash: BTreeMap::new(),
        }
    }

    /// Get the session for a group, loading it from its store on first use.
    ///
    /// A fresh session is started if the client doesn't have one, or it expired.
    pub fn instance(&mut self, group: &str) -> Result<&mut Session, Error> {
        load(&mut self.loaded, &self.stores, &self.request, group)
    }

    /// Flash data readable during this request, and the session slot the next request reads.
    ///
    /// The first call for a group and key moves the slot's content into the request data,
    /// emptying the slot. Later calls during the same request return the same data.
    pub fn flash(
        &mut self,
        group: &str,
        key: &str,
    ) -> Result<(&mut Map<String, Value>, &mut Map<String, Value>), Error> {
        let next = load(&mut self.loaded, &self.stores, &self.request, group)?.slot(key);

        let data = match self.flash.entry((group.to_string(), key.to_string())) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let data = std::mem::take(next);
                debug!(
                    "{} loaded {} variable(s) from session \"{}\"",
                    "flash".purple(),
                    data.len(),
                    group
                );
                entry.insert(data)
            }
        };

        Ok((data, next))
    }

    /// Session for a group, if it was used during this request.
    pub fn loaded(&self, group: &str) -> Option<&Session> {
        self.loaded.get(group)
    }

    /// Renew and save every session used during this request.
    pub fn save(&mut self, response: &mut Response) -> Result<(), Error> {
        for (group, session) in self.loaded.iter_mut() {
            let store = self
                .stores
                .get(group)
                .ok_or_else(|| Error::UnknownSessionGroup(group.clone()))?;

            session.renew();
            store.write(group, session, response)?;
        }

        Ok(())
    }
}

/// Get a loaded session, or load it from its store.
///
/// A fresh session is started if the client doesn't have one, or it expired.
fn load<'a>(
    loaded: &'a mut BTreeMap<String, Session>,
    stores: &SessionStores,
    request: &Request,
    group: &str,
) -> Result<&'a mut Session, Error> {
    match loaded.entry(group.to_string()) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => {
            let store = stores
                .get(group)
                .ok_or_else(|| Error::UnknownSessionGroup(group.to_string()))?;

            let session = match store.read(group, request)? {
                Some(session) if !session.expired() => session,
                _ => {
                    debug!("starting new session in group \"{}\"", group);
                    Session::new()
                }
            };

            Ok(entry.insert(session))
        }
    }
}

/// Cookie name for a session group, e.g. `rwf_session` or `rwf_session_admin`.
pub(crate) fn cookie_name(prefix: &str, group: &str) -> String {
    if group == DEFAULT_GROUP {
        prefix.to_string()
    } else {
        format!("{}_{}", prefix, group)
    }
}
