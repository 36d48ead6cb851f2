//! The store capability consumed by the request adapter.
//!
//! This trait decouples the adapter from specific storage backends. A store
//! decides where a session lives (in the cookie itself, in memory, in a
//! database) and how the client is tied to it.

use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;

use crate::error::Result;
use crate::options::Options;
use crate::request::RequestHead;
use crate::session::Session;

/// Shared handle to a store, one per application.
pub type SharedStore = Arc<dyn Store>;

/// Backend that loads and persists named sessions.
///
/// One store instance serves every in-flight request, so implementations
/// must be safe to call from many tasks at once. Internal locking or
/// immutable state are both fine; the adapter never serializes calls.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Load or initialize the named session for a request.
    ///
    /// A client with no session yet gets a fresh one (`is_new`), not an
    /// error. Errors mean the client sent something unusable or the backend
    /// failed.
    async fn load(&self, request: &RequestHead, name: &str) -> Result<Session>;

    /// Persist a session, writing whatever the client needs (usually a
    /// `Set-Cookie` header) into `response`.
    async fn save(
        &self,
        request: &RequestHead,
        response: &mut HeaderMap,
        session: &mut Session,
    ) -> Result<()>;

    /// Session used in place of one that failed to load.
    fn fresh(&self, name: &str) -> Session {
        Session::new(name, Options::default())
    }
}
