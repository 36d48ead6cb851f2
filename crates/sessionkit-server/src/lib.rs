//! Request-scoped session handling for axum.
//!
//! This crate bridges a [`Store`](sessionkit_store::Store) into the request
//! chain:
//!
//! - [`session_middleware`] creates one [`Sessions`] adapter per request
//! - handlers extract [`Sessions`] and use its verbs (get, set, delete,
//!   clear, add_flash, flashes, set_options) on any named session
//! - sessions are loaded lazily on first use and only the ones that were
//!   written are saved, right before the response is sent
//!
//! Store failures never fail a request. A session that cannot be loaded is
//! replaced by an empty one; a session that cannot be saved is lost. Both
//! are logged.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use sessionkit_server::{SessionManager, Sessions, session_middleware};
//! use sessionkit_store::CookieStore;
//!
//! async fn index(sessions: Sessions) -> String {
//!     sessions.set("app", "hello", "world").await;
//!     "ok".to_string()
//! }
//!
//! let store = CookieStore::derived(secret)?;
//! let app = Router::new()
//!     .route("/", get(index))
//!     .layer(middleware::from_fn_with_state(
//!         SessionManager::new(store),
//!         session_middleware,
//!     ));
//! ```

mod adapter;
pub mod error;
pub mod middleware;
mod named;

pub use adapter::{SaveReport, Sessions};
pub use error::{Result, SessionError};
pub use middleware::{SessionManager, session_middleware};
pub use named::NamedSession;
