//! Store that keeps the whole session in a signed cookie.

use std::fmt;

use async_trait::async_trait;
use http::{HeaderMap, header::SET_COOKIE};
use tracing::trace;

use crate::codec::{SignedCodec, decode_record, encode_record};
use crate::error::Result;
use crate::options::Options;
use crate::request::RequestHead;
use crate::session::Session;
use crate::store::Store;

/// Cookie-backed store.
///
/// Values and flashes are serialized as JSON, base64url-encoded and signed.
/// The client can read the payload but not alter it, so do not put secrets
/// in a cookie session.
pub struct CookieStore {
    codec: SignedCodec,
    options: Options,
}

impl CookieStore {
    /// Create a store that signs with `secret` as key material.
    ///
    /// The secret must be at least 64 bytes. Use [`CookieStore::derived`]
    /// for shorter secrets.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        Ok(Self {
            codec: SignedCodec::from_secret(secret.as_ref())?,
            options: Options::default(),
        })
    }

    /// Create a store whose signing key is derived from `secret`
    /// (at least 32 bytes).
    pub fn derived(secret: impl AsRef<[u8]>) -> Result<Self> {
        Ok(Self {
            codec: SignedCodec::derive_from(secret.as_ref())?,
            options: Options::default(),
        })
    }

    /// Set the options new sessions start with.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Options new sessions start with.
    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieStore")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Store for CookieStore {
    async fn load(&self, request: &RequestHead, name: &str) -> Result<Session> {
        let payload = match self.codec.decode(request, name)? {
            Some(payload) if !payload.is_empty() => payload,
            _ => {
                trace!(session = %name, "No session cookie, starting fresh");
                return Ok(self.fresh(name));
            }
        };

        let record = decode_record(&payload)?;
        Ok(Session::from_record(name, record, self.options.clone()))
    }

    async fn save(
        &self,
        _request: &RequestHead,
        response: &mut HeaderMap,
        session: &mut Session,
    ) -> Result<()> {
        let payload = if session.options.expires_immediately() {
            String::new()
        } else {
            encode_record(session.record())?
        };

        let header = self.codec.encode(session.name(), payload, &session.options)?;
        response.append(SET_COOKIE, header);
        session.is_new = false;

        trace!(session = %session.name(), "Session written to cookie");
        Ok(())
    }

    fn fresh(&self, name: &str) -> Session {
        Session::new(name, self.options.clone())
    }
}
