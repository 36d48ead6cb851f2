//! Demo HTTP application.
//!
//! A handful of routes that exercise the session verbs against the `app`
//! session: a visit counter, flash messages and logout.

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use axum::{
    Json, Router,
    body::Body,
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use sessionkit_server::{SaveReport, SessionManager, Sessions, session_middleware};
use sessionkit_store::SharedStore;

/// Name of the session the demo routes use.
pub const APP_SESSION: &str = "app";

/// Shared state for the demo routes.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Enable structured request logging.
    pub request_logging: bool,
}

/// The demo HTTP server.
pub struct Server {
    state: AppState,
    sessions: SessionManager,
}

impl Server {
    /// Create a server over the given session store.
    pub fn new(store: SharedStore, request_logging: bool) -> Self {
        Self {
            state: AppState { request_logging },
            sessions: SessionManager::from_shared(store),
        }
    }

    /// Build the router with all middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/", get(visit))
            .route("/flash", post(add_flash))
            .route("/flashes", get(take_flashes))
            .route("/logout", post(logout))
            // Sessions (inner layer, saved before logging sees the response)
            .layer(middleware::from_fn_with_state(
                self.sessions.clone(),
                session_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                request_logging_middleware,
            ))
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        axum::serve(listener, router)
            .await
            .context("Server error")?;

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
struct VisitResponse {
    visits: u64,
}

async fn visit(sessions: Sessions) -> Json<VisitResponse> {
    let visits = sessions
        .get_as::<u64>(APP_SESSION, "visits")
        .await
        .unwrap_or(0)
        + 1;
    sessions.set(APP_SESSION, "visits", visits).await;
    Json(VisitResponse { visits })
}

#[derive(Debug, Deserialize)]
struct FlashParams {
    message: String,
}

async fn add_flash(sessions: Sessions, Query(params): Query<FlashParams>) -> StatusCode {
    if params.message.is_empty() {
        return StatusCode::BAD_REQUEST;
    }
    sessions.add_flash(APP_SESSION, params.message, None).await;
    StatusCode::NO_CONTENT
}

async fn take_flashes(sessions: Sessions) -> Json<Vec<Value>> {
    Json(sessions.flashes(APP_SESSION, None).await)
}

async fn logout(sessions: Sessions) -> StatusCode {
    let mut options = sessions.session(APP_SESSION).await.options;
    options.max_age = -1;

    sessions.clear(APP_SESSION).await;
    sessions.set_options(APP_SESSION, options).await;
    sessions.mark_written(APP_SESSION).await;
    StatusCode::NO_CONTENT
}

// ─────────────────────────────────────────────────────────────────────────────
// Request logging
// ─────────────────────────────────────────────────────────────────────────────

/// Log every request together with what happened to its sessions.
///
/// Sits outside the session layer and reads the [`SaveReport`] it leaves in
/// the response extensions. A response whose sessions failed to save is
/// logged at `warn` even when the handler succeeded.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.request_logging {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;
    let report = response
        .extensions()
        .get::<SaveReport>()
        .copied()
        .unwrap_or_default();

    if status.is_server_error() {
        error!(
            %method,
            %path,
            status = status.as_u16(),
            duration_ms,
            sessions_saved = report.saved,
            sessions_failed = report.failed,
            "Request failed"
        );
    } else if report.failed > 0 {
        warn!(
            %method,
            %path,
            status = status.as_u16(),
            duration_ms,
            sessions_saved = report.saved,
            sessions_failed = report.failed,
            "Request served without persisting its sessions"
        );
    } else {
        info!(
            %method,
            %path,
            status = status.as_u16(),
            duration_ms,
            sessions_saved = report.saved,
            "Request completed"
        );
    }

    response
}
