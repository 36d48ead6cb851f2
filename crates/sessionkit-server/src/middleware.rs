//! Session middleware.
//!
//! Installs a fresh [`Sessions`] adapter into each request and saves the
//! sessions it wrote once the handler has produced a response, before any
//! of it reaches the client.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use sessionkit_store::{RequestHead, SharedStore, Store};
use tracing::trace;

use crate::adapter::Sessions;
use crate::error::SessionError;

// ─────────────────────────────────────────────────────────────────────────────
// Manager
// ─────────────────────────────────────────────────────────────────────────────

/// Middleware state: the store every request's adapter is bound to.
#[derive(Clone)]
pub struct SessionManager {
    store: SharedStore,
}

impl SessionManager {
    /// Create a manager owning `store`.
    pub fn new(store: impl Store) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create a manager over an already shared store.
    pub fn from_shared(store: SharedStore) -> Self {
        Self { store }
    }

    /// The configured store.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Session middleware function.
///
/// Use with `axum::middleware::from_fn_with_state`:
///
/// ```ignore
/// let app = Router::new()
///     .route("/", get(handler))
///     .layer(middleware::from_fn_with_state(
///         SessionManager::new(store),
///         session_middleware,
///     ));
/// ```
pub async fn session_middleware(
    State(manager): State<SessionManager>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let sessions = Sessions::new(
        RequestHead::from_request(&request),
        Arc::clone(&manager.store),
    );
    request.extensions_mut().insert(sessions.clone());

    let mut response = next.run(request).await;

    // Headers are still ours to change until this function returns
    let report = sessions.save_written(response.headers_mut()).await;
    trace!(saved = report.saved, failed = report.failed, "Session pre-send pass done");
    // Outer layers read the outcome from here
    response.extensions_mut().insert(report);

    sessions.release().await;
    response
}

// ─────────────────────────────────────────────────────────────────────────────
// Extractor
// ─────────────────────────────────────────────────────────────────────────────

impl<S> FromRequestParts<S> for Sessions
where
    S: Send + Sync,
{
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Sessions>()
            .cloned()
            .ok_or(SessionError::MissingLayer)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
