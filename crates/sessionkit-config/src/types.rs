//! Configuration types.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//! request_logging = true
//!
//! [session]
//! backend = "cookie"
//! secret = "at least 32 bytes of secret material"
//!
//! [session.options]
//! path = "/"
//! max_age = 2592000
//! http_only = true
//! same_site = "lax"
//! ```

use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};
use sessionkit_store::{DEFAULT_MAX_SESSIONS, Options};

use crate::error::{ConfigError, Result};

/// Environment variable consulted for the signing secret.
pub const SECRET_ENV_VAR: &str = "SESSIONKIT_SECRET";

/// Minimum secret length; the signing key is derived from it.
pub const MIN_SECRET_LEN: usize = 32;

/// Default port for the demo server.
pub const DEFAULT_PORT: u16 = 8080;

// ─────────────────────────────────────────────────────────────────────────────
// Root
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionkitConfig {
    pub server: ServerSection,
    pub session: SessionSection,
}

impl SessionkitConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Copy with the secret masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.session.secret.is_some() {
            config.session.secret = Some("<redacted>".to_string());
        }
        config
    }

    /// Check values that cannot be expressed in the types.
    pub fn validate(&self) -> Result<()> {
        if let Some(secret) = &self.session.secret {
            check_secret(secret)?;
        }
        if self.session.backend == Backend::Memory && self.session.max_sessions == 0 {
            return Err(ConfigError::Invalid {
                field: "session.max_sessions".to_string(),
                reason: "must be greater than zero for the memory backend".to_string(),
            });
        }
        if self.session.options.path.is_empty() {
            return Err(ConfigError::Invalid {
                field: "session.options.path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The signing secret, which must be set to serve sessions.
    pub fn require_secret(&self) -> Result<&str> {
        let secret = self
            .session
            .secret
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField {
                field: "session.secret".to_string(),
                hint: format!("set it in the config file, via {} or --secret", SECRET_ENV_VAR),
            })?;
        check_secret(secret)?;
        Ok(secret)
    }
}

fn check_secret(secret: &str) -> Result<()> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::Invalid {
            field: "session.secret".to_string(),
            reason: format!(
                "must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind the server to.
    pub bind: SocketAddr,

    /// Enable structured request logging.
    pub request_logging: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            request_logging: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Session store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Whole session in a signed cookie.
    #[default]
    Cookie,
    /// Signed id in the cookie, record in process memory.
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Cookie => write!(f, "cookie"),
            Backend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cookie" => Ok(Backend::Cookie),
            "memory" => Ok(Backend::Memory),
            other => Err(ConfigError::Invalid {
                field: "session.backend".to_string(),
                reason: format!("unknown backend '{}' (expected cookie or memory)", other),
            }),
        }
    }
}

/// `[session]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Store backend.
    pub backend: Backend,

    /// Signing secret. Prefer the environment over the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Capacity of the memory backend.
    pub max_sessions: usize,

    /// Default cookie options for new sessions.
    pub options: Options,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            secret: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
            options: Options::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionkit_store::SameSite;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SessionkitConfig::from_toml("").unwrap();
        assert_eq!(config, SessionkitConfig::default());
        assert_eq!(config.server.bind.port(), DEFAULT_PORT);
        assert_eq!(config.session.backend, Backend::Cookie);
    }

    #[test]
    fn test_full_config() {
        let config = SessionkitConfig::from_toml(
            r#"
            [server]
            bind = "0.0.0.0:9000"
            request_logging = false

            [session]
            backend = "memory"
            secret = "0123456789abcdef0123456789abcdef"
            max_sessions = 50

            [session.options]
            path = "/app"
            domain = "example.com"
            max_age = 0
            secure = true
            same_site = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind.port(), 9000);
        assert!(!config.server.request_logging);
        assert_eq!(config.session.backend, Backend::Memory);
        assert_eq!(config.session.max_sessions, 50);
        assert_eq!(config.session.options.path, "/app");
        assert_eq!(config.session.options.domain.as_deref(), Some("example.com"));
        assert_eq!(config.session.options.max_age, 0);
        assert!(config.session.options.secure);
        assert!(config.session.options.http_only);
        assert_eq!(config.session.options.same_site, Some(SameSite::Strict));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_backend_is_a_parse_error() {
        let result = SessionkitConfig::from_toml("[session]\nbackend = \"redis\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Memory".parse::<Backend>().unwrap(), Backend::Memory);
        assert!("redis".parse::<Backend>().is_err());
        assert_eq!(Backend::Cookie.to_string(), "cookie");
    }

    #[test]
    fn test_require_secret() {
        let mut config = SessionkitConfig::new();
        assert!(matches!(
            config.require_secret(),
            Err(ConfigError::MissingField { .. })
        ));

        config.session.secret = Some("short".to_string());
        assert!(matches!(
            config.require_secret(),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(config.validate().is_err());

        config.session.secret = Some(SECRET.to_string());
        assert_eq!(config.require_secret().unwrap(), SECRET);
    }

    #[test]
    fn test_memory_backend_needs_capacity() {
        let mut config = SessionkitConfig::new();
        config.session.backend = Backend::Memory;
        config.session.max_sessions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted_roundtrip() {
        let mut config = SessionkitConfig::new();
        config.session.secret = Some(SECRET.to_string());

        let rendered = config.redacted().to_toml().unwrap();
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));

        let reparsed = SessionkitConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }
}
