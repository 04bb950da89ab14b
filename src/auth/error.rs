use axum::http::StatusCode;
use thiserror::Error;

/// Why a bearer token was not accepted.
///
/// Every variant maps to a fixed HTTP status and a machine-readable code that
/// is returned to the caller next to the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingAuthorization,

    #[error("{0}")]
    MalformedHeader(String),

    #[error("Unable to find the appropriate key.")]
    UnknownSigningKey,

    #[error("Signing keys are unavailable: {0}")]
    KeySetUnavailable(String),

    #[error("{0}")]
    InvalidSignature(String),

    #[error("Token expired.")]
    TokenExpired,

    #[error("{0}")]
    InvalidClaims(String),

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,

    #[error("Permission '{0}' not found.")]
    InsufficientScope(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::InsufficientScope(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "authorization_header_missing",
            AuthError::MalformedHeader(_) => "invalid_header",
            AuthError::UnknownSigningKey => "unknown_signing_key",
            AuthError::KeySetUnavailable(_) => "key_set_unavailable",
            AuthError::InvalidSignature(_) => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::PermissionsMissing => "invalid_claims",
            AuthError::InsufficientScope(_) => "insufficient_scope",
        }
    }

    pub(crate) fn malformed(msg: &str) -> Self {
        AuthError::MalformedHeader(msg.to_string())
    }

    pub(crate) fn invalid_signature(msg: &str) -> Self {
        AuthError::InvalidSignature(msg.to_string())
    }
}
