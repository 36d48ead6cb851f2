//! Signed cookie encoding shared by the cookie-based stores.
//!
//! The MAC is computed and verified by the `cookie` crate's signed jar; this
//! module only decides what goes into the cookie and how it is framed.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use cookie::{Cookie, CookieJar, Key, time::Duration};
use http::HeaderValue;

use crate::error::{Result, StoreError};
use crate::options::Options;
use crate::request::RequestHead;
use crate::session::SessionRecord;

/// Largest `Set-Cookie` value a store will emit.
pub const MAX_COOKIE_SIZE: usize = 4096;

/// Minimum secret length accepted for key derivation.
const MIN_DERIVE_SECRET: usize = 32;

/// Signs and verifies cookie values with one key.
#[derive(Clone)]
pub(crate) struct SignedCodec {
    key: Key,
}

impl SignedCodec {
    /// Use `secret` directly as signing key material (at least 64 bytes).
    pub(crate) fn from_secret(secret: &[u8]) -> Result<Self> {
        let key = Key::try_from(secret).map_err(|e| StoreError::Key(e.to_string()))?;
        Ok(Self { key })
    }

    /// Derive the signing key from a shorter secret (at least 32 bytes).
    pub(crate) fn derive_from(secret: &[u8]) -> Result<Self> {
        if secret.len() < MIN_DERIVE_SECRET {
            return Err(StoreError::Key(format!(
                "secret must be at least {} bytes, got {}",
                MIN_DERIVE_SECRET,
                secret.len()
            )));
        }
        Ok(Self {
            key: Key::derive_from(secret),
        })
    }

    /// Verified payload of the named cookie.
    ///
    /// `Ok(None)` if the client sent no such cookie.
    pub(crate) fn decode(&self, request: &RequestHead, name: &str) -> Result<Option<String>> {
        let Some(raw) = request.cookie(name) else {
            return Ok(None);
        };

        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(name.to_string(), raw));

        match jar.signed(&self.key).get(name) {
            Some(cookie) => Ok(Some(cookie.value().to_string())),
            None => Err(StoreError::InvalidCookie(format!(
                "signature check failed for '{}'",
                name
            ))),
        }
    }

    /// Signed `Set-Cookie` header value for `payload`.
    pub(crate) fn encode(&self, name: &str, payload: String, options: &Options) -> Result<HeaderValue> {
        let mut builder = Cookie::build((name.to_string(), payload))
            .path(options.path.clone())
            .secure(options.secure)
            .http_only(options.http_only);

        if let Some(domain) = &options.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(same_site) = options.same_site {
            builder = builder.same_site(same_site.into());
        }
        if options.expires_immediately() {
            builder = builder.max_age(Duration::ZERO);
        } else if options.max_age > 0 {
            builder = builder.max_age(Duration::seconds(options.max_age));
        }

        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key).add(builder);
        let signed = jar
            .get(name)
            .ok_or_else(|| StoreError::Backend(format!("signed cookie '{}' missing from jar", name)))?;

        let encoded = signed.to_string();
        if encoded.len() > MAX_COOKIE_SIZE {
            return Err(StoreError::CookieTooLarge {
                size: encoded.len(),
                max: MAX_COOKIE_SIZE,
            });
        }

        Ok(HeaderValue::from_str(&encoded)?)
    }
}

/// Serialize a record into a cookie-safe payload.
pub(crate) fn encode_record(record: &SessionRecord) -> Result<String> {
    let json = serde_json::to_vec(record)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Inverse of [`encode_record`].
pub(crate) fn decode_record(payload: &str) -> Result<SessionRecord> {
    let json = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use http::{HeaderMap, Method, Uri, header::COOKIE};

    pub(crate) const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef-test-secret";

    /// Request head replaying the name=value pair of a `Set-Cookie` value.
    pub(crate) fn replay(set_cookie: &HeaderValue) -> RequestHead {
        let pair = set_cookie
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&pair).unwrap());
        RequestHead::new(Method::GET, Uri::from_static("/"), headers)
    }

    #[test]
    fn test_signed_roundtrip() {
        let codec = SignedCodec::derive_from(SECRET).unwrap();
        let header = codec
            .encode("app", "payload".to_string(), &Options::default())
            .unwrap();

        let head = replay(&header);
        assert_eq!(codec.decode(&head, "app").unwrap(), Some("payload".to_string()));
        assert_eq!(codec.decode(&head, "other").unwrap(), None);
    }

    #[test]
    fn test_tampered_cookie_is_rejected() {
        let codec = SignedCodec::derive_from(SECRET).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("app=forged-value"));
        let head = RequestHead::new(Method::GET, Uri::from_static("/"), headers);

        assert!(matches!(
            codec.decode(&head, "app"),
            Err(StoreError::InvalidCookie(_))
        ));
    }

    #[test]
    fn test_other_key_is_rejected() {
        let codec = SignedCodec::derive_from(SECRET).unwrap();
        let other = SignedCodec::derive_from(b"another-secret-that-is-long-enough-for-hkdf").unwrap();
        let header = codec
            .encode("app", "payload".to_string(), &Options::default())
            .unwrap();

        assert!(other.decode(&replay(&header), "app").is_err());
    }

    #[test]
    fn test_short_secrets_are_rejected() {
        assert!(matches!(
            SignedCodec::derive_from(b"short"),
            Err(StoreError::Key(_))
        ));
        assert!(matches!(
            SignedCodec::from_secret(SECRET),
            Err(StoreError::Key(_))
        ));
        assert!(SignedCodec::from_secret(&[7u8; 64]).is_ok());
    }

    #[test]
    fn test_cookie_attributes() {
        let codec = SignedCodec::derive_from(SECRET).unwrap();
        let options = Options::default()
            .with_path("/app")
            .with_domain("example.com")
            .with_max_age(60)
            .with_secure(true)
            .with_same_site(crate::options::SameSite::Lax);
        let header = codec.encode("app", "v".to_string(), &options).unwrap();
        let cookie = Cookie::parse(header.to_str().unwrap().to_string()).unwrap();

        assert_eq!(cookie.path(), Some("/app"));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(60)));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(cookie::SameSite::Lax));
    }

    #[test]
    fn test_script_readable_cookie() {
        let codec = SignedCodec::derive_from(SECRET).unwrap();
        let header = codec
            .encode("app", "v".to_string(), &Options::default().with_http_only(false))
            .unwrap();

        assert!(!header.to_str().unwrap().contains("HttpOnly"));
    }

    #[test]
    fn test_max_age_variants() {
        let codec = SignedCodec::derive_from(SECRET).unwrap();

        let session_only = codec
            .encode("app", "v".to_string(), &Options::default().with_max_age(0))
            .unwrap();
        let cookie = Cookie::parse(session_only.to_str().unwrap().to_string()).unwrap();
        assert_eq!(cookie.max_age(), None);

        let delete = codec
            .encode("app", "v".to_string(), &Options::default().with_max_age(-1))
            .unwrap();
        let cookie = Cookie::parse(delete.to_str().unwrap().to_string()).unwrap();
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn test_oversized_cookie() {
        let codec = SignedCodec::derive_from(SECRET).unwrap();
        let result = codec.encode("app", "x".repeat(MAX_COOKIE_SIZE), &Options::default());
        assert!(matches!(result, Err(StoreError::CookieTooLarge { .. })));
    }

    #[test]
    fn test_record_payload() {
        let mut record = SessionRecord::default();
        record
            .values
            .insert("greeting".to_string(), serde_json::json!("hello; world"));
        let payload = encode_record(&record).unwrap();
        assert!(!payload.contains(';'));
        assert_eq!(decode_record(&payload).unwrap(), record);
        assert!(decode_record("%%%").is_err());
    }
}
