//! Error types for the session layer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Session layer error type.
///
/// Store failures never show up here: they are logged where they happen
/// and the request continues.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A handler asked for `Sessions` but the middleware is not installed.
    #[error("Session middleware not installed on this route")]
    MissingLayer,

    /// A typed value could not be converted to a session value.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for session layer operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            SessionError::MissingLayer => (StatusCode::INTERNAL_SERVER_ERROR, "session_layer_missing"),
            SessionError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error")
            }
        };

        let message = self.to_string();
        tracing::error!(status = %status, code, error = %message, "Session error");

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
