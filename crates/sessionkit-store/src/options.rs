//! Cookie options for a session or session store.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default cookie path.
pub const DEFAULT_PATH: &str = "/";

/// Default cookie lifetime in seconds (30 days).
pub const DEFAULT_MAX_AGE: i64 = 86_400 * 30;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl From<SameSite> for cookie::SameSite {
    fn from(value: SameSite) -> Self {
        match value {
            SameSite::Strict => cookie::SameSite::Strict,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::None => cookie::SameSite::None,
        }
    }
}

/// Configuration for a session or session store.
///
/// Fields are a subset of cookie attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Cookie path scope.
    pub path: String,

    /// Cookie domain scope. `None` leaves the attribute off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// `0` means no `Max-Age` attribute (a browser-session cookie).
    /// `< 0` means delete the cookie now, equivalently `Max-Age=0`.
    /// `> 0` means `Max-Age` is present and given in seconds.
    pub max_age: i64,

    /// Only send the cookie over encrypted transport.
    pub secure: bool,

    /// Hide the cookie from client-side script.
    pub http_only: bool,

    /// Optional `SameSite` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            path: DEFAULT_PATH.to_string(),
            domain: None,
            max_age: DEFAULT_MAX_AGE,
            secure: false,
            http_only: true,
            same_site: None,
        }
    }
}

impl Options {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the max age in seconds (see [`Options::max_age`]).
    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the `Secure` flag.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the `HttpOnly` flag.
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set the `SameSite` attribute.
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Whether saving with these options deletes the cookie.
    pub fn expires_immediately(&self) -> bool {
        self.max_age < 0
    }

    /// Explicit lifetime, if any.
    pub fn lifetime(&self) -> Option<Duration> {
        u64::try_from(self.max_age)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.path, "/");
        assert_eq!(options.max_age, DEFAULT_MAX_AGE);
        assert!(options.http_only);
        assert!(!options.secure);
        assert!(options.domain.is_none());
    }

    #[test]
    fn test_builders() {
        let options = Options::new()
            .with_path("/admin")
            .with_http_only(false)
            .with_secure(true);
        assert_eq!(options.path, "/admin");
        assert!(!options.http_only);
        assert!(options.secure);
    }

    #[test]
    fn test_lifetime() {
        assert_eq!(
            Options::new().with_max_age(60).lifetime(),
            Some(Duration::from_secs(60))
        );
        assert_eq!(Options::new().with_max_age(0).lifetime(), None);
        assert_eq!(Options::new().with_max_age(-1).lifetime(), None);
        assert!(Options::new().with_max_age(-1).expires_immediately());
        assert!(!Options::new().with_max_age(0).expires_immediately());
    }

    #[test]
    fn test_deserialize_partial() {
        let options: Options =
            serde_json::from_str(r#"{"max_age": 0, "same_site": "strict"}"#).unwrap();
        assert_eq!(options.max_age, 0);
        assert_eq!(options.same_site, Some(SameSite::Strict));
        // Unspecified fields keep their defaults
        assert_eq!(options.path, "/");
        assert!(options.http_only);
    }
}
