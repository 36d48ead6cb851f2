//! Error types for session store operations.

/// Error type for session store operations.
///
/// Every variant means the same thing to the request adapter: the store
/// call failed. The adapter logs it and carries on.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The session cookie was present but failed signature verification.
    #[error("Invalid session cookie: {0}")]
    InvalidCookie(String),

    /// The signing key could not be built from the given secret.
    #[error("Invalid signing key: {0}")]
    Key(String),

    /// The encoded cookie exceeds what browsers accept.
    #[error("Session cookie too large: {size} bytes (max {max})")]
    CookieTooLarge { size: usize, max: usize },

    /// Session values could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The cookie payload was not valid base64.
    #[error("Encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The `Set-Cookie` value was not a valid header value.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// Error from a storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
