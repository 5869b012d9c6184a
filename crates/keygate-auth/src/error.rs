//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to load key material: {0}")]
    KeyLoad(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Malformed token")]
    MalformedToken,

    #[error("Unexpected signing algorithm")]
    AlgorithmMismatch,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl AuthError {
    /// Whether this error came from token extraction or verification.
    ///
    /// Rejection errors share a single response body so an untrusted
    /// client cannot probe which verification stage failed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken
                | AuthError::AlgorithmMismatch
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::MissingAuthHeader
                | AuthError::InvalidAuthHeader
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = if self.is_rejection() {
            (StatusCode::FORBIDDEN, "Not authorized")
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_kinds_are_uniform() {
        assert!(AuthError::MalformedToken.is_rejection());
        assert!(AuthError::AlgorithmMismatch.is_rejection());
        assert!(AuthError::InvalidSignature.is_rejection());
        assert!(AuthError::TokenExpired.is_rejection());
        assert!(AuthError::MissingAuthHeader.is_rejection());
        assert!(!AuthError::KeyLoad("x".into()).is_rejection());
        assert!(!AuthError::Signing("x".into()).is_rejection());
    }
}
