//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    http::{HeaderMap, HeaderValue},
    middleware,
    routing::get,
};
use sessionkit_server::{SessionManager, Sessions, session_middleware};
use sessionkit_store::{Options, RequestHead, Session, SharedStore, Store, StoreError};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Header the recording store appends for every saved session.
pub const SAVED_HEADER: &str = "x-session-saved";

// ─────────────────────────────────────────────────────────────────────────────
// Recording store
// ─────────────────────────────────────────────────────────────────────────────

/// A store that records every call and can be told to fail per name.
#[derive(Default)]
pub struct RecordingStore {
    loads: Mutex<Vec<String>>,
    saves: Mutex<Vec<String>>,
    fail_load: HashSet<String>,
    fail_save: HashSet<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loads of `name` fail.
    pub fn with_failing_load(mut self, name: &str) -> Self {
        self.fail_load.insert(name.to_string());
        self
    }

    /// Make saves of `name` fail.
    pub fn with_failing_save(mut self, name: &str) -> Self {
        self.fail_save.insert(name.to_string());
        self
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }

    /// Save attempts, failed ones included.
    pub fn saves(&self) -> Vec<String> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn load(&self, _request: &RequestHead, name: &str) -> sessionkit_store::Result<Session> {
        self.loads.lock().unwrap().push(name.to_string());
        if self.fail_load.contains(name) {
            return Err(StoreError::Backend(format!("cannot load {}", name)));
        }
        Ok(Session::new(name, Options::default()))
    }

    async fn save(
        &self,
        _request: &RequestHead,
        response: &mut HeaderMap,
        session: &mut Session,
    ) -> sessionkit_store::Result<()> {
        self.saves.lock().unwrap().push(session.name().to_string());
        if self.fail_save.contains(session.name()) {
            return Err(StoreError::Backend(format!("cannot save {}", session.name())));
        }
        response.append(SAVED_HEADER, HeaderValue::from_str(session.name())?);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test app
// ─────────────────────────────────────────────────────────────────────────────

async fn set_handler(sessions: Sessions) -> &'static str {
    sessions.set("app", "hello", "world").await;
    "set"
}

async fn get_handler(sessions: Sessions) -> String {
    match sessions.get("app", "missing").await {
        Some(value) => value.to_string(),
        None => "absent".to_string(),
    }
}

async fn two_handler(sessions: Sessions) -> &'static str {
    sessions.set("first", "n", 1).await;
    sessions.set("second", "n", 2).await;
    sessions.get("read-only", "n").await;
    "two"
}

async fn flash_check_handler(sessions: Sessions) -> String {
    sessions.flashes("app", None).await.len().to_string()
}

async fn noop_handler() -> &'static str {
    "noop"
}

/// Router with the session middleware over `store`.
pub fn app(store: Arc<RecordingStore>) -> Router {
    let shared: SharedStore = store;
    Router::new()
        .route("/set", get(set_handler))
        .route("/get", get(get_handler))
        .route("/two", get(two_handler))
        .route("/flash-check", get(flash_check_handler))
        .route("/noop", get(noop_handler))
        .layer(middleware::from_fn_with_state(
            SessionManager::from_shared(shared),
            session_middleware,
        ))
}

/// Names the recording store reported as saved in a response.
pub fn saved_names(headers: &HeaderMap) -> Vec<String> {
    let mut names: Vec<String> = headers
        .get_all(SAVED_HEADER)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

// ─────────────────────────────────────────────────────────────────────────────
// Log capture
// ─────────────────────────────────────────────────────────────────────────────

/// Layer collecting the messages of ERROR events.
#[derive(Clone, Default)]
pub struct ErrorEvents {
    messages: Arc<Mutex<Vec<String>>>,
}

impl ErrorEvents {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages()
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }
}

impl<S: Subscriber> Layer<S> for ErrorEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            let mut visitor = MessageVisitor::default();
            event.record(&mut visitor);
            self.messages.lock().unwrap().push(visitor.0);
        }
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}
