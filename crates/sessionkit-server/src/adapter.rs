//! Request-scoped session adapter.
//!
//! A [`Sessions`] value lives for exactly one request. It opens named
//! sessions from the store on first use, remembers which ones were mutated,
//! and writes those back when the middleware runs its pre-send step.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sessionkit_store::{Options, RequestHead, Session, SharedStore};
use tokio::sync::Mutex;
use tracing::{debug, error, trace};

use crate::error::Result;
use crate::named::NamedSession;

/// Outcome of a [`Sessions::save_written`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Sessions persisted successfully.
    pub saved: usize,
    /// Sessions whose save failed (already logged).
    pub failed: usize,
}

/// Sessions opened during this request.
#[derive(Default)]
struct Loaded {
    sessions: HashMap<String, Session>,
    written: HashSet<String>,
}

struct Inner {
    request: RequestHead,
    store: SharedStore,
    state: Mutex<Loaded>,
}

/// Per-request access to named sessions.
///
/// Cloning is cheap and every clone sees the same state, which is how the
/// middleware and the handlers share one adapter. Reading never marks a
/// session written; every mutating verb does, and so does reading flashes
/// since that consumes them.
#[derive(Clone)]
pub struct Sessions {
    inner: Arc<Inner>,
}

impl Sessions {
    /// Create an adapter for one request.
    pub fn new(request: RequestHead, store: SharedStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                request,
                store,
                state: Mutex::new(Loaded::default()),
            }),
        }
    }

    /// The request this adapter was created for.
    pub fn request(&self) -> &RequestHead {
        &self.inner.request
    }

    /// A view bound to one session name.
    pub fn named(&self, name: impl Into<String>) -> NamedSession {
        NamedSession::new(self.clone(), name.into())
    }

    /// Value stored under `key`, if any.
    pub async fn get(&self, name: &str, key: &str) -> Option<Value> {
        self.with_session(name, false, |session| session.get(key).cloned())
            .await
    }

    /// Value stored under `key`, deserialized.
    ///
    /// Returns `None` when the key is absent or holds a different shape.
    pub async fn get_as<T: DeserializeOwned>(&self, name: &str, key: &str) -> Option<T> {
        self.get(name, key)
            .await
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Store `value` under `key`.
    pub async fn set(&self, name: &str, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        self.with_session(name, true, move |session| {
            session.insert(key, value);
        })
        .await;
    }

    /// Serialize `value` and store it under `key`.
    pub async fn insert<T: Serialize + ?Sized>(
        &self,
        name: &str,
        key: impl Into<String>,
        value: &T,
    ) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(name, key, value).await;
        Ok(())
    }

    /// Remove `key`. Marks the session written even if the key was absent.
    pub async fn delete(&self, name: &str, key: &str) {
        self.with_session(name, true, |session| {
            session.remove(key);
        })
        .await;
    }

    /// Delete every value and every pending flash in the session.
    ///
    /// Marks the session written if it held anything. Clearing a session
    /// that is already empty leaves it unwritten.
    pub async fn clear(&self, name: &str) {
        let had_state = self
            .with_session(name, false, |session| session.clear())
            .await;

        if had_state {
            self.mark_written(name).await;
        }
    }

    /// Append a flash message to list `key` (default `"_flash"`).
    pub async fn add_flash(&self, name: &str, value: impl Into<Value>, key: Option<&str>) {
        let value = value.into();
        self.with_session(name, true, |session| session.add_flash(value, key))
            .await;
    }

    /// Take the flash list `key` (default `"_flash"`).
    ///
    /// Always marks the session written, even when there was nothing to
    /// take.
    pub async fn flashes(&self, name: &str, key: Option<&str>) -> Vec<Value> {
        self.with_session(name, true, |session| session.take_flashes(key))
            .await
    }

    /// Replace the cookie options the session will be saved with.
    pub async fn set_options(&self, name: &str, options: Options) {
        self.with_session(name, false, |session| session.options = options)
            .await;
    }

    /// Force the session to be saved at the end of the request.
    pub async fn mark_written(&self, name: &str) {
        self.with_session(name, true, |_| ()).await;
    }

    /// Snapshot of the named session, loading it if needed.
    pub async fn session(&self, name: &str) -> Session {
        self.with_session(name, false, |session| session.clone())
            .await
    }

    /// Whether the session was mutated during this request.
    pub async fn written(&self, name: &str) -> bool {
        self.inner.state.lock().await.written.contains(name)
    }

    /// Names of every session opened during this request.
    pub async fn loaded_names(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .await
            .sessions
            .keys()
            .cloned()
            .collect()
    }

    /// Persist every written session into `response`.
    ///
    /// Each save is attempted independently; a failure is logged and does
    /// not stop the others.
    pub async fn save_written(&self, response: &mut HeaderMap) -> SaveReport {
        let mut guard = self.inner.state.lock().await;
        let state = &mut *guard;
        let mut report = SaveReport::default();

        for (name, session) in state.sessions.iter_mut() {
            if !state.written.contains(name) {
                continue;
            }

            match self
                .inner
                .store
                .save(&self.inner.request, response, session)
                .await
            {
                Ok(()) => {
                    debug!(session = %name, "Session saved");
                    report.saved += 1;
                }
                Err(e) => {
                    error!(session = %name, error = %e, "Session store save failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Drop everything opened during this request.
    pub async fn release(&self) {
        let mut state = self.inner.state.lock().await;
        state.sessions.clear();
        state.written.clear();
    }

    async fn with_session<R>(
        &self,
        name: &str,
        mark_written: bool,
        f: impl FnOnce(&mut Session) -> R,
    ) -> R {
        let mut guard = self.inner.state.lock().await;
        let state = &mut *guard;

        if mark_written {
            state.written.insert(name.to_string());
        }

        let session = match state.sessions.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(self.load(name).await),
        };

        f(session)
    }

    /// Load a session from the store, falling back to a fresh one.
    async fn load(&self, name: &str) -> Session {
        match self.inner.store.load(&self.inner.request, name).await {
            Ok(session) => {
                trace!(session = %name, is_new = session.is_new, "Session loaded");
                session
            }
            Err(e) => {
                error!(session = %name, error = %e, "Session store load failed");
                self.inner.store.fresh(name)
            }
        }
    }
}
