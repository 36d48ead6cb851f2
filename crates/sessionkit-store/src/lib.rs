//! Named sessions and the stores that persist them.
//!
//! This crate provides the storage side of sessionkit:
//! - [`Session`], a named bag of values plus one-shot flash messages
//! - [`Options`], the cookie attributes a session is written with
//! - [`Store`], the capability the request adapter loads from and saves to
//! - [`CookieStore`] and [`MemoryStore`], two ready-made backends whose
//!   signing is delegated to the `cookie` crate
//!
//! # Example
//!
//! ```rust,ignore
//! use sessionkit_store::{CookieStore, Options};
//!
//! let store = CookieStore::new(secret)?
//!     .with_options(Options::default().with_max_age(3600));
//! ```

mod codec;
mod cookie_store;
mod error;
mod memory;
mod options;
mod request;
mod session;
mod store;

pub use codec::MAX_COOKIE_SIZE;
pub use cookie_store::CookieStore;
pub use error::{Result, StoreError};
pub use memory::{DEFAULT_MAX_SESSIONS, MemoryStore, MemoryStoreConfig};
pub use options::{DEFAULT_MAX_AGE, DEFAULT_PATH, Options, SameSite};
pub use request::RequestHead;
pub use session::{DEFAULT_FLASH_KEY, Session, SessionRecord};
pub use store::{SharedStore, Store};
