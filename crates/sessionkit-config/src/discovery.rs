//! Config file discovery.
//!
//! The first file found wins:
//! 1. An explicit path (`--config`)
//! 2. `./sessionkit.toml` (project-local)
//! 3. `~/.config/sessionkit/config.toml` (user config)
//!
//! With no file at all the defaults apply. CLI arguments are layered on top
//! by the caller.

use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, SessionkitConfig};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "sessionkit.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "sessionkit";

/// Environment variable to override the user config directory.
const CONFIG_DIR_ENV: &str = "SESSIONKIT_CONFIG_DIR";

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The loaded configuration.
    pub config: SessionkitConfig,
    /// File the configuration came from, if any.
    pub source: Option<PathBuf>,
    /// Warnings generated during loading (e.g., a plaintext secret).
    pub warnings: Vec<String>,
}

/// Discover and load the configuration.
///
/// An explicit path must exist. Discovered files that fail to parse are
/// skipped with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(explicit, None, user_config_dir().as_deref())
}

/// Load configuration with explicit control over the search directories.
///
/// `project_dir` replaces the working directory and `config_dir` replaces the
/// user config directory.
pub fn load_config_with_options(
    explicit: Option<&Path>,
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut warnings = Vec::new();

    if let Some(path) = explicit {
        let config = load_config_file(path)?;
        check_plaintext_secret(&config, path, &mut warnings);
        return Ok(LoadedConfig {
            config,
            source: Some(path.to_path_buf()),
            warnings,
        });
    }

    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    let candidates = std::iter::once(project_path)
        .chain(config_dir.map(|d| d.join(USER_CONFIG_FILE)));

    for path in candidates {
        if !path.is_file() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                check_plaintext_secret(&config, &path, &mut warnings);
                return Ok(LoadedConfig {
                    config,
                    source: Some(path),
                    warnings,
                });
            }
            Err(e) => warnings.push(format!("Failed to load {}: {}", path.display(), e)),
        }
    }

    Ok(LoadedConfig {
        config: SessionkitConfig::default(),
        source: None,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<SessionkitConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    SessionkitConfig::from_toml(&contents)
}

/// Get the user config file path for sessionkit.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the user config directory for sessionkit.
///
/// Checks `SESSIONKIT_CONFIG_DIR` first, then falls back to the platform
/// default.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join(APP_NAME)),
    }
}

fn check_plaintext_secret(config: &SessionkitConfig, path: &Path, warnings: &mut Vec<String>) {
    if config.session.secret.is_some() {
        warnings.push(format!(
            "Session secret is stored in plaintext in {}. Consider setting {} instead.",
            path.display(),
            crate::SECRET_ENV_VAR
        ));
    }
}
