//! In-memory store with LRU eviction and max-age expiry.
//!
//! Only a signed session id travels in the cookie; the record stays on the
//! server. Useful for tests and single-process deployments.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Instant;

use async_trait::async_trait;
use http::{HeaderMap, header::SET_COOKIE};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::codec::SignedCodec;
use crate::error::Result;
use crate::options::Options;
use crate::request::RequestHead;
use crate::session::{Session, SessionRecord};
use crate::store::Store;

/// Default maximum number of sessions kept in memory.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Configuration for the memory store.
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Maximum number of sessions kept before LRU eviction.
    pub max_sessions: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl MemoryStoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of sessions to keep.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }
}

/// Entry stored in the map.
#[derive(Debug, Clone)]
struct MemoryEntry {
    record: SessionRecord,

    /// `None` for browser-session cookies (no server-side expiry).
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Memory-backed store.
pub struct MemoryStore {
    codec: SignedCodec,
    options: Options,
    config: MemoryStoreConfig,
    entries: Mutex<LruCache<String, MemoryEntry>>,
}

impl MemoryStore {
    /// Create a store signing session ids with `secret` (at least 64 bytes).
    pub fn new(secret: impl AsRef<[u8]>, config: MemoryStoreConfig) -> Result<Self> {
        Ok(Self::with_codec(SignedCodec::from_secret(secret.as_ref())?, config))
    }

    /// Create a store whose signing key is derived from `secret`
    /// (at least 32 bytes).
    pub fn derived(secret: impl AsRef<[u8]>, config: MemoryStoreConfig) -> Result<Self> {
        Ok(Self::with_codec(SignedCodec::derive_from(secret.as_ref())?, config))
    }

    fn with_codec(codec: SignedCodec, config: MemoryStoreConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            codec,
            options: Options::default(),
            config,
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Set the options new sessions start with.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Get the store configuration.
    pub fn config(&self) -> &MemoryStoreConfig {
        &self.config
    }

    /// Number of stored sessions, expired ones included until cleaned up.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every expired session, returning how many were removed.
    ///
    /// Expired sessions are also dropped lazily when a client presents one.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    /// Drop every session expired as of `now`.
    fn cleanup_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            entries.pop(id);
        }

        if !expired.is_empty() {
            debug!(count = expired.len(), "Cleaned up expired sessions");
        }
        expired.len()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("options", &self.options)
            .field("config", &self.config)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self, request: &RequestHead, name: &str) -> Result<Session> {
        let id = match self.codec.decode(request, name)? {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(self.fresh(name)),
        };

        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(&id) {
            if !entry.is_expired(now) {
                trace!(session = %name, id = %id, "Session found in memory");
                return Ok(
                    Session::from_record(name, entry.record.clone(), self.options.clone())
                        .with_id(id),
                );
            }
            debug!(session = %name, id = %id, "Session expired, removing");
        }
        entries.pop(&id);

        Ok(self.fresh(name))
    }

    async fn save(
        &self,
        _request: &RequestHead,
        response: &mut HeaderMap,
        session: &mut Session,
    ) -> Result<()> {
        if session.options.expires_immediately() {
            if let Some(id) = session.id.take() {
                self.entries.lock().pop(&id);
                debug!(session = %session.name(), id = %id, "Session removed");
            }
            let header = self
                .codec
                .encode(session.name(), String::new(), &session.options)?;
            response.append(SET_COOKIE, header);
            return Ok(());
        }

        let id = session
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        let entry = MemoryEntry {
            record: session.record().clone(),
            expires_at: session.options.lifetime().map(|ttl| Instant::now() + ttl),
        };

        {
            let mut entries = self.entries.lock();
            if let Some((evicted, _)) = entries.push(id.clone(), entry) {
                if evicted != id {
                    debug!(id = %evicted, "Evicting LRU session to make room");
                }
            }
        }

        let header = self.codec.encode(session.name(), id, &session.options)?;
        response.append(SET_COOKIE, header);
        session.is_new = false;
        Ok(())
    }

    fn fresh(&self, name: &str) -> Session {
        Session::new(name, self.options.clone())
    }
}
