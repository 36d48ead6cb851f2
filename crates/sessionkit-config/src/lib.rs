//! Configuration for sessionkit.
//!
//! Provides TOML-based configuration with:
//! - `[server]` bind address and request logging
//! - `[session]` store backend, signing secret and capacity
//! - `[session.options]` default cookie attributes
//!
//! Config file discovery: an explicit path, then `./sessionkit.toml`, then
//! the user config directory. CLI arguments override file values.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, user_config_dir,
    user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
